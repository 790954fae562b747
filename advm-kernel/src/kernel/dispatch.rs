use super::KernelId;
use super::entry::KernelImpl;
use super::table::{KernelBinding, KernelTable};

use crate::error::{KernelError, Result};
use crate::signature::ArgShapes;
use crate::trace::{self, TraceKind};
use crate::variant::Variant;
use crate::workaround::{CallOrigin, find_workaround};

/// Everything a kernel call gets besides its arguments.
pub struct CallContext<'a, S> {
    /// The host's game state; native functions do their work through it.
    pub state: &'a mut S,
    pub origin: CallOrigin<'a>,
}

impl<'a, S> CallContext<'a, S> {
    pub fn new(state: &'a mut S, origin: CallOrigin<'a>) -> Self {
        Self { state, origin }
    }
}

impl<S> KernelTable<S> {
    /// Runs kernel call `id` for the interpreter.
    ///
    /// The arguments are checked against the binding's signature, then the
    /// binding's workarounds are tried in order. A matching workaround's value
    /// is returned without calling the implementation, which also rescues a
    /// call whose arguments did not fit the signature.
    pub fn dispatch(
        &self,
        id: KernelId,
        ctx: &mut CallContext<'_, S>,
        args: &[Variant],
    ) -> Result<Variant> {
        let Some(binding) = self.binding(id) else {
            log::error!(
                "kernel call #{} is not defined for engine version {}",
                id,
                self.version()
            );
            return Err(KernelError::UnresolvedOrdinal {
                id,
                version: self.version(),
            });
        };
        let origin = &ctx.origin;
        if trace::enabled(TraceKind::Kernel) {
            trace::kernel(format_args!(
                "{}{} #{} from {}::{} (room {})",
                binding.name,
                ArgShapes::of(args),
                id,
                origin.object_name,
                origin.method_name,
                origin.room
            ));
        }

        let checked = if self.config().validate_signatures {
            binding.signature.check(args)
        } else {
            Ok(())
        };
        if let Err(reason) = &checked {
            if trace::enabled(TraceKind::Signature) {
                let shapes = ArgShapes::of(args);
                trace::signature(format_args!("{} rejected {shapes}: {reason}", binding.name));
            }
        }

        let workaround = if self.config().apply_workarounds {
            find_workaround(binding.workarounds, origin, args)
        } else {
            None
        };
        if let Some(w) = workaround {
            if checked.is_err() {
                log::warn!(
                    "kernel call {} from {}::{} has bad arguments {}, substituting {} ({})",
                    binding.name,
                    origin.object_name,
                    origin.method_name,
                    ArgShapes::of(args),
                    w.result,
                    w.note
                );
            } else {
                trace::workaround(format_args!(
                    "{} from {}::{} -> {} ({})",
                    binding.name,
                    origin.object_name,
                    origin.method_name,
                    w.result,
                    w.note
                ));
            }
            return Ok(w.result);
        }

        if let Err(reason) = checked {
            let err = KernelError::SignatureViolation {
                id,
                name: binding.name,
                version: self.version(),
                expected: binding.signature.to_string(),
                received: ArgShapes::of(args),
                reason,
            };
            log::error!(
                "{} (from {}::{})",
                err,
                origin.object_name,
                origin.method_name
            );
            return Err(err);
        }

        binding.invoke(ctx, args)
    }
}

impl<S> KernelBinding<S> {
    fn invoke(&self, ctx: &mut CallContext<'_, S>, args: &[Variant]) -> Result<Variant> {
        match self.implementation {
            KernelImpl::Native(func) => func(ctx, args).map_err(|e| {
                log::error!("kernel call {} (#{}) failed: {:#}", self.name, self.id, e);
                KernelError::Native {
                    id: self.id,
                    name: self.name,
                    source: e.into(),
                }
            }),
            KernelImpl::Stub(kind) => Ok(kind.invoke(self.id, self.name, args)),
        }
    }
}

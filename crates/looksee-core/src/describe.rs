//! Human-readable module descriptions
//!
//! Singleton classes have no name of their own, so they are described by the
//! value they are attached to, wrapped in one pair of brackets per singleton
//! level: `[C]` for the singleton class of `C`, `[[C]]` for its singleton
//! class, `[C instance]` for the singleton class of a plain `C` object.

use crate::error::InspectError;
use crate::host::HostModel;
use crate::model::{Handle, ModuleId, NodeKind};

pub fn describe_module<M: HostModel + ?Sized>(
    model: &M,
    node: ModuleId,
    max_levels: usize,
) -> Result<String, InspectError> {
    let mut brackets = 0;
    let mut subject = Handle::Module(node);
    while let Handle::Module(module) = subject {
        if !model.is_singleton_class(module) {
            break;
        }
        if brackets == max_levels {
            return Err(InspectError::internal(format!(
                "singleton nesting of {} exceeded {} levels",
                node, max_levels
            )));
        }
        brackets += 1;
        subject = model.attached_object_of(module)?;
    }

    let description = match subject {
        Handle::Module(module) => {
            let module = model.canonical_class_of(module);
            let name = model.module_name(module);
            if !name.is_empty() {
                name
            } else if model.node_kind(module) == NodeKind::Module {
                "unnamed Module".to_string()
            } else {
                "unnamed Class".to_string()
            }
        }
        Handle::Object(_) => format!("{} instance", model.type_name_of(subject)),
        Handle::Method(_) => {
            return Err(InspectError::type_kind(
                "module or object",
                model.type_name_of(subject),
            ))
        }
    };

    Ok(format!(
        "{}{}{}",
        "[".repeat(brackets),
        description,
        "]".repeat(brackets)
    ))
}

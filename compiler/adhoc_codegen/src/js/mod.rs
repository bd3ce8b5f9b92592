//! JavaScript backend.
//!
//! Values are garbage collected, so no retain/release is emitted, string
//! literals are written in place, and nested actions stay nested as
//! closures. Executable output hangs every action off a namespace object
//! and ends by running the root:
//!
//! ```text
//! var Main = Main || {};
//! Main.run = function(){
//!     ...
//! };
//! Main.run();
//! ```

use adhoc_diagnostic::{Diagnostic, ErrorCode};
use adhoc_ir::builtins::{Builtin, LibraryDef};
use adhoc_ir::{DataType, OperatorWhich};

use crate::emitter::{quote, Emitter, ModuleInfo, Operand, Signature, Target};

#[derive(Copy, Clone, Debug, Default)]
pub struct JsEmitter;

impl JsEmitter {
    pub fn new() -> Self {
        JsEmitter
    }
}

fn params(sig: &Signature<'_>) -> String {
    let names: Vec<&str> = sig.params.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Whether a definition is attached to the namespace object.
fn is_namespaced(module: &ModuleInfo, sig: &Signature<'_>) -> bool {
    module.executable && !sig.anonymous
}

/// `text` as a member-access receiver.
fn receiver(text: &str) -> String {
    let plain = text
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'));
    let quoted = text.len() >= 2 && text.starts_with('"') && text.ends_with('"');
    if plain || quoted {
        text.to_string()
    } else {
        format!("({text})")
    }
}

/// `[a, b].join("")`
fn joined<'a>(args: impl IntoIterator<Item = &'a Operand>) -> String {
    let parts: Vec<&str> = args.into_iter().map(|a| a.text.as_str()).collect();
    format!("[{}].join(\"\")", parts.join(", "))
}

fn arg<'a>(
    def: &LibraryDef,
    args: &'a [Operand],
    position: usize,
) -> Result<&'a Operand, Diagnostic> {
    args.get(position).ok_or_else(|| {
        Diagnostic::error(ErrorCode::E4002)
            .with_message(format!("`{}` takes {}", def.name, def.arity()))
    })
}

impl Emitter for JsEmitter {
    fn target(&self) -> Target {
        Target::JavaScript
    }

    fn manages_lifetimes(&self) -> bool {
        false
    }

    fn hoists_actions(&self) -> bool {
        false
    }

    fn inline_strings(&self) -> bool {
        true
    }

    fn type_name(&self, _ty: DataType) -> Result<String, Diagnostic> {
        Ok("var".to_string())
    }

    fn local(&self, _ty: DataType, name: &str, init: Option<&str>) -> Result<String, Diagnostic> {
        Ok(match init {
            Some(init) => format!("var {name} = {init};"),
            None => format!("var {name};"),
        })
    }

    fn null_value(&self) -> &'static str {
        "null"
    }

    fn function_header(
        &self,
        module: &ModuleInfo,
        sig: &Signature<'_>,
    ) -> Result<String, Diagnostic> {
        let params = params(sig);
        Ok(if sig.anonymous {
            format!("function({params}){{")
        } else if is_namespaced(module, sig) {
            format!("{}.{} = function({params}){{", module.namespace, sig.name)
        } else {
            format!("function {}({params}){{", sig.name)
        })
    }

    fn function_footer(&self, module: &ModuleInfo, sig: &Signature<'_>) -> &'static str {
        if is_namespaced(module, sig) {
            "};"
        } else {
            "}"
        }
    }

    fn retain(&self, value: &str) -> String {
        value.to_string()
    }

    fn release(&self, value: &str) -> String {
        value.to_string()
    }

    fn string_literal(&self, text: &str) -> String {
        quote(text)
    }

    fn create_container(
        &self,
        ty: DataType,
        _element: DataType,
        _len: usize,
    ) -> Result<String, Diagnostic> {
        match ty {
            DataType::Array => Ok("[]".to_string()),
            DataType::Hash | DataType::Struct => Ok("{}".to_string()),
            _ => Err(Diagnostic::error(ErrorCode::E1002)
                .with_message(format!("{ty} is not a container type"))),
        }
    }

    fn store_element(&self, container: &str, key: &str, value: &Operand) -> String {
        format!("{}[{key}] = {}", receiver(container), value.text)
    }

    fn load_element(
        &self,
        container: &str,
        index: &str,
        _ty: DataType,
    ) -> Result<String, Diagnostic> {
        Ok(format!("{}[{index}]", receiver(container)))
    }

    fn binary(
        &self,
        op: OperatorWhich,
        lhs: &Operand,
        rhs: &Operand,
        _result: DataType,
    ) -> Result<String, Diagnostic> {
        let (a, b) = (&lhs.text, &rhs.text);
        Ok(match op {
            OperatorWhich::Exponent => format!("Math.pow({a}, {b})"),
            _ => format!("{a} {} {b}", op.symbol()),
        })
    }

    fn call(&self, module: &ModuleInfo, name: &str, args: &[Operand]) -> String {
        let args: Vec<&str> = args.iter().map(|a| a.text.as_str()).collect();
        if module.executable {
            format!("{}.{name}({})", module.namespace, args.join(", "))
        } else {
            format!("{name}({})", args.join(", "))
        }
    }

    fn library_call(&self, def: &LibraryDef, args: &[Operand]) -> Result<String, Diagnostic> {
        let text = match def.builtin {
            Builtin::Print => format!("console.log({})", joined(args)),
            Builtin::ToString => format!("String({})", arg(def, args, 0)?.text),
            Builtin::Concat => joined(args),
            Builtin::Substring => format!(
                "{}.substr({}, {})",
                receiver(&arg(def, args, 0)?.text),
                arg(def, args, 1)?.text,
                arg(def, args, 2)?.text
            ),
            Builtin::Splice => {
                let s = receiver(&arg(def, args, 0)?.text);
                let (at, len) = (&arg(def, args, 1)?.text, &arg(def, args, 2)?.text);
                let insert = &arg(def, args, 3)?.text;
                format!("({s}.substr(0, {at}) + {insert} + {s}.substr(({at}) + ({len})))")
            }
            Builtin::Find => format!(
                "{}.indexOf({})",
                receiver(&arg(def, args, 0)?.text),
                arg(def, args, 1)?.text
            ),
            Builtin::Append => {
                let target = &arg(def, args, 0)?.text;
                format!("{target} = {target} + {}", joined(&args[1..]))
            }
            Builtin::Count => {
                let value = arg(def, args, 0)?;
                match value.ty {
                    DataType::Hash | DataType::Struct => {
                        format!("Object.keys({}).length", value.text)
                    }
                    _ => format!("{}.length", receiver(&value.text)),
                }
            }
        };
        Ok(text)
    }

    fn module_prologue(&self, module: &ModuleInfo) -> Result<Vec<String>, Diagnostic> {
        if !module.executable {
            return Ok(Vec::new());
        }
        let ns = &module.namespace;
        Ok(vec![format!("var {ns} = {ns} || {{}};")])
    }

    fn module_epilogue(&self, module: &ModuleInfo) -> Result<Vec<String>, Diagnostic> {
        if !module.executable {
            return Ok(Vec::new());
        }
        Ok(vec![format!("{}.{}();", module.namespace, module.root)])
    }
}

// Tests

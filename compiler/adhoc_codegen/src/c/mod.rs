//! C backend.
//!
//! Output links against the `libadhoc` runtime. Every complex value is an
//! `adhoc_data*` with explicit reference counting, so this backend
//! [manages lifetimes](Emitter::manages_lifetimes). C has no nested
//! functions: every action is hoisted to file scope behind a prototype.
//!
//! ```text
//! #include "libadhoc.h"
//!
//! int addOne(int param);
//!
//! int addOne(int param){
//!     return param + 1;
//! }
//! ```

use std::ops::RangeInclusive;

use adhoc_arc::runtime::{type_constant, RuntimeFn, RUNTIME_HEADER, VALUE_TYPE};
use adhoc_arc::ArcClassification;
use adhoc_diagnostic::{no_target_equivalent, Diagnostic, ErrorCode};
use adhoc_ir::builtins::{type_tag, LibraryDef};
use adhoc_ir::{DataType, OperatorWhich};

use crate::emitter::{quote, Emitter, ModuleInfo, Operand, Signature, Target};

#[derive(Copy, Clone, Debug, Default)]
pub struct CEmitter;

impl CEmitter {
    pub fn new() -> Self {
        CEmitter
    }

    /// `ret name(params)`, shared by prototypes and headers.
    fn signature_text(&self, sig: &Signature<'_>) -> Result<String, Diagnostic> {
        if sig.anonymous {
            return Err(no_target_equivalent("C", "an action used as a value"));
        }
        let returns = self.type_name(sig.returns)?;
        let params = if sig.params.is_empty() {
            "void".to_string()
        } else {
            let mut params = Vec::with_capacity(sig.params.len());
            for param in &sig.params {
                params.push(format!("{} {}", self.type_name(param.ty)?, param.name));
            }
            params.join(", ")
        };
        Ok(format!("{returns} {}({params})", sig.name))
    }
}

/// Leading `"si…"` argument of tagged runtime calls.
fn type_tags(args: &[Operand]) -> Result<String, Diagnostic> {
    let mut tags = String::with_capacity(args.len() + 2);
    tags.push('"');
    for arg in args {
        let Some(tag) = type_tag(arg.ty) else {
            return Err(no_target_equivalent("C", format!("passing a {} value", arg.ty)));
        };
        tags.push(tag);
    }
    tags.push('"');
    Ok(tags)
}

impl Emitter for CEmitter {
    fn target(&self) -> Target {
        Target::C
    }

    fn manages_lifetimes(&self) -> bool {
        true
    }

    fn hoists_actions(&self) -> bool {
        true
    }

    fn inline_strings(&self) -> bool {
        false
    }

    fn int_range(&self) -> RangeInclusive<i64> {
        i64::from(i32::MIN)..=i64::from(i32::MAX)
    }

    fn type_name(&self, ty: DataType) -> Result<String, Diagnostic> {
        let name = match ty {
            DataType::Void => "void",
            DataType::Bool => "bool",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::String | DataType::Array | DataType::Hash | DataType::Struct => VALUE_TYPE,
            DataType::Action | DataType::Mixed => {
                return Err(no_target_equivalent("C", format!("the {ty} type")));
            }
        };
        Ok(name.to_string())
    }

    fn local(&self, ty: DataType, name: &str, init: Option<&str>) -> Result<String, Diagnostic> {
        if ty == DataType::Void {
            return Err(no_target_equivalent("C", format!("a void variable `{name}`")));
        }
        let ty = self.type_name(ty)?;
        Ok(match init {
            Some(init) => format!("{ty} {name} = {init};"),
            None => format!("{ty} {name};"),
        })
    }

    fn null_value(&self) -> &'static str {
        "NULL"
    }

    fn action_comment(&self, text: &str) -> Option<String> {
        Some(format!("// {text}"))
    }

    fn prototype(
        &self,
        _module: &ModuleInfo,
        sig: &Signature<'_>,
    ) -> Result<Option<String>, Diagnostic> {
        Ok(Some(format!("{};", self.signature_text(sig)?)))
    }

    fn function_header(
        &self,
        _module: &ModuleInfo,
        sig: &Signature<'_>,
    ) -> Result<String, Diagnostic> {
        Ok(format!("{}{{", self.signature_text(sig)?))
    }

    fn function_footer(&self, _module: &ModuleInfo, _sig: &Signature<'_>) -> &'static str {
        "}"
    }

    fn retain(&self, value: &str) -> String {
        format!("{}({value})", RuntimeFn::Retain.symbol())
    }

    fn release(&self, value: &str) -> String {
        format!("{}({value})", RuntimeFn::Release.symbol())
    }

    fn string_literal(&self, text: &str) -> String {
        format!("{}({})", RuntimeFn::CreateString.symbol(), quote(text))
    }

    fn create_container(
        &self,
        ty: DataType,
        element: DataType,
        len: usize,
    ) -> Result<String, Diagnostic> {
        if ty != DataType::Array {
            return Err(Diagnostic::error(ErrorCode::E3001)
                .with_message(format!("{ty} literals are not supported by the C backend")));
        }
        let Some(constant) = type_constant(element) else {
            return Err(no_target_equivalent("C", format!("an array of {element} elements")));
        };
        Ok(format!("{}({constant}, {len})", RuntimeFn::CreateArray.symbol()))
    }

    fn store_element(&self, container: &str, key: &str, value: &Operand) -> String {
        let symbol = RuntimeFn::StoreElement.symbol();
        if value.ty.is_complex() {
            format!("{symbol}({container}, {key}, {}, 0)", value.text)
        } else {
            format!("{symbol}({container}, {key}, NULL, {})", value.text)
        }
    }

    fn load_element(
        &self,
        container: &str,
        index: &str,
        ty: DataType,
    ) -> Result<String, Diagnostic> {
        if ty.is_complex() {
            return Ok(format!("{}({container}, {index})", RuntimeFn::GetElementC.symbol()));
        }
        let ty = self.type_name(ty)?;
        Ok(format!("(({ty}){}({container}, {index}))", RuntimeFn::GetElementS.symbol()))
    }

    fn binary(
        &self,
        op: OperatorWhich,
        lhs: &Operand,
        rhs: &Operand,
        result: DataType,
    ) -> Result<String, Diagnostic> {
        let (a, b) = (&lhs.text, &rhs.text);
        if op == OperatorWhich::Plus && result == DataType::String {
            let tags = type_tags(&[lhs.clone(), rhs.clone()])?;
            return Ok(format!("{}({tags}, {a}, {b})", RuntimeFn::Concat.symbol()));
        }
        if lhs.ty.is_complex() || rhs.ty.is_complex() {
            return Err(no_target_equivalent(
                "C",
                format!("`{}` on {} and {} values", op.symbol(), lhs.ty, rhs.ty),
            ));
        }
        Ok(match op {
            OperatorWhich::Exponent => format!("pow({a}, {b})"),
            OperatorWhich::Modulo if result == DataType::Float => format!("fmod({a}, {b})"),
            _ => format!("{a} {} {b}", op.symbol()),
        })
    }

    fn call(&self, _module: &ModuleInfo, name: &str, args: &[Operand]) -> String {
        let args: Vec<&str> = args.iter().map(|a| a.text.as_str()).collect();
        format!("{name}({})", args.join(", "))
    }

    fn library_call(&self, def: &LibraryDef, args: &[Operand]) -> Result<String, Diagnostic> {
        let routine = RuntimeFn::from(def.builtin);
        let mut parts = Vec::with_capacity(args.len() + 1);
        if routine.takes_type_tags() {
            parts.push(type_tags(args)?);
        }
        parts.extend(args.iter().map(|a| a.text.clone()));
        Ok(format!("{}({})", routine.symbol(), parts.join(", ")))
    }

    fn module_prologue(&self, module: &ModuleInfo) -> Result<Vec<String>, Diagnostic> {
        if module.executable && module.root == "main" {
            return Err(no_target_equivalent(
                "C",
                "a root action named `main` in an executable module",
            ));
        }
        Ok(vec![format!("#include {}", quote(RUNTIME_HEADER))])
    }

    fn module_epilogue(&self, module: &ModuleInfo) -> Result<Vec<String>, Diagnostic> {
        if !module.executable {
            return Ok(Vec::new());
        }
        if module.root_params > 0 {
            return Err(no_target_equivalent("C", "an entry point with parameters"));
        }
        let run = format!("{}()", module.root);
        let run = if module.root_type.is_complex() {
            self.release(&run)
        } else {
            run
        };
        Ok(vec![
            String::new(),
            "int main(void){".to_string(),
            format!("\t{run};"),
            "\treturn 0;".to_string(),
            "}".to_string(),
        ])
    }
}

// Tests

#[cfg(test)]
mod tests;

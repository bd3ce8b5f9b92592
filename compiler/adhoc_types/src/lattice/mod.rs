//! The type-widening lattice.
//!
//! `resolve(a, b)` picks the type a binary operation over `a` and `b`
//! produces:
//!
//! 1. identical types pass through unchanged;
//! 2. Mixed, Action, Struct, or Void on either side poisons to Void;
//! 3. Hash absorbs Array;
//! 4. otherwise the higher-ranked type wins.
//!
//! The function is symmetric. Void doubles as the "type error" sentinel.

use adhoc_ir::DataType;

/// Types that poison any mixed pairing.
fn poisons(ty: DataType) -> bool {
    matches!(
        ty,
        DataType::Mixed | DataType::Action | DataType::Struct | DataType::Void
    )
}

pub fn resolve(a: DataType, b: DataType) -> DataType {
    if a == b {
        return a;
    }
    if poisons(a) || poisons(b) {
        return DataType::Void;
    }
    match (a, b) {
        (DataType::Hash, DataType::Array) | (DataType::Array, DataType::Hash) => DataType::Hash,
        _ => a.max(b),
    }
}

/// Element type of a container built from values of `types`.
///
/// Elements that widen cleanly give the widened type; elements that poison
/// the lattice give Mixed. An empty container has element type Void.
pub fn element_type(types: impl IntoIterator<Item = DataType>) -> DataType {
    let mut iter = types.into_iter();
    let Some(first) = iter.next() else {
        return DataType::Void;
    };
    let mut widened = first;
    for ty in iter {
        widened = resolve(widened, ty);
        if widened == DataType::Void {
            return DataType::Mixed;
        }
    }
    widened
}

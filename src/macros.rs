/// Invokes another macro once per signed integer width.
/// The coordinate, timestamp, and tag-path types each define the same
/// family of integer conversions; feeding an impl-generating macro
/// through this keeps those tables in one place. Widths the wire
/// format never carries (128-bit, pointer-sized) are deliberately
/// absent; the handful of unsigned conversions the crate needs are
/// written out by hand next to the types that own them.
#[macro_export]
macro_rules! for_each_int_type {
    ($macro:path) => {
        $macro!{i64}
        $macro!{i32}
        $macro!{i16}
        $macro!{i8}
    };
}

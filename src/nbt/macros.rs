/// Shorthand way to create a Tag::Compound.
/// Example:
/// ```no_run
/// use worldsmith::compound;
/// use worldsmith::nbt::tag::Tag;
/// compound!{
///     ("Item One", 0i8),
///     (String::from("Item Two"), 2i32),
///     ("Item Three", Tag::Byte(1))
/// };
/// ```
#[macro_export]
macro_rules! compound {
    ($(($name:expr, $value:expr)),+$(,)?) => {
        $crate::nbt::tag::Tag::Compound($crate::nbt::tag::Map::from([
            $(
                ($crate::list!(@literal_to_owned;$name), $crate::nbt::tag::Tag::from($value)),
            )+
        ]))
    };
    () => {
        $crate::nbt::tag::Tag::Compound($crate::nbt::tag::Map::new())
    };
}

/// Shorthand way to create a Tag::List.
/// Example:
/// ```no_run
/// use worldsmith::list;
/// list!{ 1, 2, 3, 4, 5, 6, 7, 8, 9, 10 };
/// list![
///     "One".to_owned(),
///     "Two".to_owned()
/// ];
/// ```
#[macro_export]
macro_rules! list {
    ($($item:expr),+$(,)?) => {
        $crate::nbt::tag::Tag::List($crate::nbt::tag::ListTag::from(std::vec![
            $(
                $crate::list!(@literal_to_owned;$item),
            )+
        ]))
    };
    ($value:expr; $repititions:expr) => {
        $crate::nbt::tag::Tag::List($crate::nbt::tag::ListTag::from(std::vec![$crate::list!(@literal_to_owned;$value); $repititions]))
    };
    () => {
        $crate::nbt::tag::Tag::List($crate::nbt::tag::ListTag::Empty)
    };
    (@literal_to_owned;$lit:literal) => {
        $lit.to_owned()
    };
    (@literal_to_owned;$($other:tt)+) => {
        $($other)+
    };
}

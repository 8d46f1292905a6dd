/// Build a [`Sequence`](crate::Sequence) from a list of elements or a
/// repeated value.
///
/// ```
/// use advec::seq;
///
/// let empty: advec::Sequence<u8> = seq![];
/// assert!(empty.is_empty());
///
/// let listed = seq![1, 2, 3];
/// assert_eq!(listed, [1, 2, 3]);
/// assert_eq!(listed.capacity(), 3);
///
/// let repeated = seq!["x"; 2];
/// assert_eq!(repeated, ["x", "x"]);
/// ```
#[macro_export]
macro_rules! seq {
    () => {
        $crate::Sequence::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::Sequence::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::Sequence::from([$($x),+])
    };
}

macro_rules! __impl_slice_eq {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty, $($constraints:tt)*) => {
        impl<T, U, A, const B: usize, $($vars)*> PartialEq<$rhs> for $lhs
        where
            T: PartialEq<U>,
            A: BlockAlloc,
            $($constraints)*
        {
            fn eq(&self, other: &$rhs) -> bool {
                self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
            }
        }
    }
}

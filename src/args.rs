use std::hash::{BuildHasher, Hash};

use crate::fix::Fix;

/// An argument tuple usable as a cache key.
///
/// Implemented for tuples up to length twelve whose elements are hashable,
/// comparable and clonable. Keys own their values, so identity is
/// structural: two tuples are the same key iff they are element-wise equal.
pub trait Args: Hash + Eq + Clone {
    /// The number of elements in the tuple.
    const ARITY: usize;

    /// Fold the elements' individual hashes from left to right.
    fn fold_hashes<S, Acc>(&self, build: &S, init: Acc, f: impl FnMut(Acc, u64) -> Acc) -> Acc
    where
        S: BuildHasher;
}

/// A function that can be called with an argument tuple.
///
/// Implemented for everything that is `Fn(A0, .., An) -> O`.
pub trait Apply<A, O> {
    /// Spread the tuple into the function's parameters.
    fn apply(&self, args: A) -> O;
}

/// A generator for a fixed-point memoizer.
///
/// Implemented for everything that is `Fn(&Fix<A, O>, A0, .., An) -> O`.
pub trait Generate<A, O> {
    /// Run one step of the recursion, issuing nested calls through `this`.
    fn generate(&self, this: &Fix<'_, A, O>, args: A) -> O;
}

macro_rules! one {
    ($param:ident) => {
        1
    };
}

macro_rules! args {
    ($($param:ident $idx:tt),*) => {
        impl<$($param),*> Args for ($($param,)*)
        where
            $($param: Hash + Eq + Clone,)*
        {
            const ARITY: usize = 0 $(+ one!($param))*;

            #[allow(unused_mut, unused_variables)]
            #[inline]
            fn fold_hashes<S, Acc>(&self, build: &S, init: Acc, mut f: impl FnMut(Acc, u64) -> Acc) -> Acc
            where
                S: BuildHasher,
            {
                let mut acc = init;
                $(acc = f(acc, build.hash_one(&self.$idx));)*
                acc
            }
        }

        impl<Func, Out, $($param),*> Apply<($($param,)*), Out> for Func
        where
            Func: Fn($($param),*) -> Out,
        {
            #[allow(unused_variables)]
            #[inline]
            fn apply(&self, args: ($($param,)*)) -> Out {
                self($(args.$idx),*)
            }
        }

        impl<Func, Out, $($param),*> Generate<($($param,)*), Out> for Func
        where
            Func: Fn(&Fix<'_, ($($param,)*), Out>, $($param),*) -> Out,
        {
            #[allow(unused_variables)]
            #[inline]
            fn generate(&self, this: &Fix<'_, ($($param,)*), Out>, args: ($($param,)*)) -> Out {
                self(this, $(args.$idx),*)
            }
        }
    };
}

args! {}
args! { A 0 }
args! { A 0, B 1 }
args! { A 0, B 1, C 2 }
args! { A 0, B 1, C 2, D 3 }
args! { A 0, B 1, C 2, D 3, E 4 }
args! { A 0, B 1, C 2, D 3, E 4, F 5 }
args! { A 0, B 1, C 2, D 3, E 4, F 5, G 6 }
args! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7 }
args! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8 }
args! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9 }
args! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10 }
args! { A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        assert_eq!(<() as Args>::ARITY, 0);
        assert_eq!(<(u8,) as Args>::ARITY, 1);
        assert_eq!(<(u8, String, bool) as Args>::ARITY, 3);
    }

    #[test]
    fn test_fold_visits_in_order() {
        let build = rustc_hash::FxBuildHasher;
        let seen = (1u8, 2u8, 3u8).fold_hashes(&build, Vec::new(), |mut acc, h| {
            acc.push(h);
            acc
        });
        let expected: Vec<u64> = [1u8, 2, 3].iter().map(|v| build.hash_one(v)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_apply_spreads_tuple() {
        fn concat(a: &'static str, b: String, c: char) -> String {
            format!("{a}{b}{c}")
        }

        assert_eq!(concat.apply(("x", "y".to_string(), 'z')), "xyz");
        assert_eq!((|| 7).apply(()), 7);
    }
}

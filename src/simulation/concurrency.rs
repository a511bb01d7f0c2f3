//! Cell-parallel loops. Every solver phase writes one (or two) output buffers
//! indexed by cell and only reads from other buffers, so each cell can be
//! processed independently. On `wasm32` the same loops run sequentially.

pub use internal::*;

#[cfg(target_arch = "wasm32")]
mod internal {
    pub fn par_iter_mut1<T1: Send + Sync, F: Fn(usize, &mut T1) + Send + Sync>(arr1: &mut [T1], f: F) {
        arr1.iter_mut().enumerate().for_each(|(idx, v1)| {
            f(idx, v1);
        });
    }

    pub fn par_iter_mut2<T1: Send + Sync, T2: Send + Sync, F: Fn(usize, &mut T1, &mut T2) + Send + Sync>(
        arr1: &mut [T1],
        arr2: &mut [T2],
        f: F,
    ) {
        assert_eq!(arr1.len(), arr2.len());
        arr1.iter_mut()
            .zip(arr2.iter_mut())
            .enumerate()
            .for_each(|(idx, (v1, v2))| {
                f(idx, v1, v2);
            });
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod internal {
    use rayon::prelude::*;

    pub fn par_iter_mut1<T1: Send + Sync, F: Fn(usize, &mut T1) + Send + Sync>(arr1: &mut [T1], f: F) {
        arr1.into_par_iter().enumerate().for_each(|(idx, v1)| {
            f(idx, v1);
        });
    }

    pub fn par_iter_mut2<T1: Send + Sync, T2: Send + Sync, F: Fn(usize, &mut T1, &mut T2) + Send + Sync>(
        arr1: &mut [T1],
        arr2: &mut [T2],
        f: F,
    ) {
        assert_eq!(arr1.len(), arr2.len());
        arr1.into_par_iter()
            .zip(arr2.into_par_iter())
            .enumerate()
            .for_each(|(idx, (v1, v2))| {
                f(idx, v1, v2);
            });
    }
}

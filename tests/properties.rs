use cellprep::filters::{
    add_salt_and_pepper, bilateral_filter, gaussian_blur, laplacian_sharpen, median_blur,
    to_grayscale, unsharp_mask, LaplacianKernel, UnsharpParams,
};
use cellprep::selection::{apply_mask_black, circular_mask};
use cellprep::{Filter, ImageTransform};
use ndarray::{Array2, Array3};
use proptest::prelude::*;

fn image_strategy() -> impl Strategy<Value = Array3<u8>> {
    (1usize..12, 1usize..12, prop_oneof![Just(1usize), Just(3), Just(4)]).prop_flat_map(
        |(h, w, c)| {
            proptest::collection::vec(any::<u8>(), h * w * c)
                .prop_map(move |data| Array3::from_shape_vec((h, w, c), data).unwrap())
        },
    )
}

fn denoisers() -> Vec<Filter> {
    vec![
        Filter::Gaussian { ksize: 5, sigma: 0.0 },
        Filter::Gaussian { ksize: 0, sigma: 1.5 },
        Filter::Median { ksize: 3 },
        Filter::Median { ksize: 5 },
        Filter::Bilateral {
            diameter: 5,
            sigma_color: 30.0,
            sigma_space: 2.0,
        },
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn denoisers_preserve_shape(img in image_strategy()) {
        for filter in denoisers() {
            let out = filter.apply(img.view()).unwrap();
            prop_assert_eq!(out.dim(), img.dim(), "{}", filter.name());
        }
    }

    #[test]
    fn sharpeners_preserve_shape(img in image_strategy()) {
        let out = unsharp_mask(img.view(), &UnsharpParams::default()).unwrap();
        prop_assert_eq!(out.dim(), img.dim());
        for kernel in [LaplacianKernel::FourNeighbor, LaplacianKernel::EightNeighbor] {
            let out = laplacian_sharpen(img.view(), kernel).unwrap();
            prop_assert_eq!(out.dim(), img.dim());
        }
    }

    #[test]
    fn unsharp_zero_amount_is_identity(img in image_strategy()) {
        let params = UnsharpParams { amount: 0.0, ..UnsharpParams::default() };
        prop_assert_eq!(unsharp_mask(img.view(), &params).unwrap(), img);
    }

    #[test]
    fn all_true_mask_is_identity(img in image_strategy()) {
        let (h, w, _) = img.dim();
        let mask = Array2::from_elem((h, w), true);
        prop_assert_eq!(apply_mask_black(img.view(), mask.view()).unwrap(), img);
    }

    #[test]
    fn grayscale_is_idempotent(img in image_strategy()) {
        let once = to_grayscale(img.view()).unwrap();
        let twice = to_grayscale(once.view()).unwrap();
        prop_assert_eq!(once.dim().2, 1);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn radius_zero_mask_has_one_pixel(h in 1usize..20, w in 1usize..20, cy in 0usize..20, cx in 0usize..20) {
        let mask = circular_mask(h, w, (cx as f32, cy as f32), 0.0).unwrap();
        let count = mask.iter().filter(|&&v| v).count();
        let inside = cx < w && cy < h;
        prop_assert_eq!(count, usize::from(inside));
        if inside {
            prop_assert!(mask[[cy, cx]]);
        }
    }
}

#[test]
fn uniform_gray_is_fixed_point_of_blur_filters() {
    let img = Array3::<u8>::from_elem((4, 4, 1), 128);
    for ksize in [1, 3, 5, 7] {
        assert_eq!(gaussian_blur(img.view(), ksize, 0.0).unwrap(), img);
        assert_eq!(median_blur(img.view(), ksize).unwrap(), img);
    }
    assert_eq!(bilateral_filter(img.view(), 5, 25.0, 5.0).unwrap(), img);
}

#[test]
fn five_by_five_radius_one_mask() {
    let mask = circular_mask(5, 5, (2.0, 2.0), 1.0).unwrap();
    let selected: Vec<(usize, usize)> = mask
        .indexed_iter()
        .filter(|(_, &v)| v)
        .map(|(idx, _)| idx)
        .collect();
    assert_eq!(selected, vec![(1, 2), (2, 1), (2, 2), (2, 3), (3, 2)]);
}

#[test]
fn median_cleans_salt_and_pepper_better_than_gaussian() {
    let clean = Array3::<u8>::from_elem((16, 16, 1), 120);
    let noisy = add_salt_and_pepper(clean.view(), 0.05, 3).unwrap();

    let error = |img: &Array3<u8>| -> u32 {
        img.iter()
            .zip(clean.iter())
            .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
            .sum()
    };

    let median = median_blur(noisy.view(), 3).unwrap();
    let gaussian = gaussian_blur(noisy.view(), 3, 0.0).unwrap();
    assert!(error(&median) < error(&gaussian));
}

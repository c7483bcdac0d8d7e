//! Image handling: decoding and the fixed preprocessing pipeline.

pub mod preprocessing;

pub use preprocessing::{
    BINARIZE_THRESHOLD, binarize, decode_image, denoise, is_bilevel, preprocess, preprocess_image, to_grayscale,
};

// Performance
#![warn(clippy::imprecise_flops)]
#![warn(clippy::inline_always)]
#![warn(clippy::large_types_passed_by_value)]
// Can result in worse code generation: https://github.com/rust-lang/rust-clippy/issues/14944
#![allow(clippy::manual_div_ceil)]
#![warn(clippy::needless_bitwise_bool)]
#![warn(clippy::needless_collect)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::non_std_lazy_statics)]
#![warn(clippy::or_fun_call)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::ref_option)]
#![warn(clippy::stable_sort_primitive)]
#![warn(clippy::suboptimal_flops)]
#![warn(clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::unnecessary_box_returns)]
// Readability/Code Intention
#![warn(clippy::checked_conversions)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::cloned_instead_of_copied)]
#![warn(clippy::enum_glob_use)]
#![warn(clippy::equatable_if_let)]
#![warn(clippy::if_then_some_else_none)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::inconsistent_struct_constructor)]
#![warn(clippy::invalid_upcast_comparisons)]
#![warn(clippy::manual_assert)]
#![warn(clippy::manual_is_power_of_two)]
#![warn(clippy::manual_let_else)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::match_bool)]
#![warn(clippy::mod_module_files)]
#![warn(clippy::needless_continue)]
#![warn(clippy::needless_pass_by_ref_mut)]
#![warn(clippy::option_if_let_else)]
#![warn(clippy::precedence_bits)]
#![warn(clippy::range_minus_one)]
#![warn(clippy::range_plus_one)]
#![warn(clippy::redundant_test_prefix)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::tests_outside_test_module)]
#![warn(clippy::unused_rounding)]
#![warn(clippy::verbose_bit_mask)]
// Correctness/Safety
#![deny(clippy::cfg_not_test)]
#![warn(clippy::collection_is_never_read)]
#![warn(clippy::dbg_macro)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![warn(clippy::infinite_loop)]
#![warn(clippy::large_stack_arrays)]
#![warn(clippy::large_stack_frames)]
#![warn(clippy::mem_forget)]
#![warn(clippy::mixed_read_write_in_expression)]
#![warn(clippy::mut_mut)]
#![deny(clippy::non_send_fields_in_send_ty)]
#![warn(clippy::suspicious_operation_groupings)]
#![warn(clippy::transmute_undefined_repr)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::unwrap_used)]
// Annoyances
#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::uninlined_format_args)]
#![allow(unsafe_op_in_unsafe_fn)]

//! Motion-compensated prediction core for VVC-class video codecs.
//!
//! The crate turns padded reference-picture samples into predicted sample
//! blocks: fractional-sample interpolation ([`interp`]), explicit weighted
//! prediction ([`weighted`]) and geometric partition blending ([`geo`]). Every
//! vectorized kernel is bit-exact with its scalar counterpart, and the
//! implementation in use is chosen once per process through a [`KernelSet`].


#[cfg(feature = "bench")]
pub mod block;
#[cfg(feature = "bench")]
pub mod clip;
#[cfg(feature = "bench")]
pub mod error;
#[cfg(feature = "bench")]
pub mod geo;
#[cfg(feature = "bench")]
pub mod interp;
#[cfg(feature = "bench")]
pub mod kernels;
#[cfg(feature = "bench")]
pub mod observer;
#[cfg(feature = "bench")]
pub mod params;
#[cfg(feature = "bench")]
pub mod tables;
#[cfg(feature = "bench")]
pub mod util;
#[cfg(feature = "bench")]
pub mod weighted;

#[cfg(not(feature = "bench"))]
mod block;
#[cfg(not(feature = "bench"))]
mod clip;
#[cfg(not(feature = "bench"))]
mod error;
#[cfg(not(feature = "bench"))]
mod geo;
#[cfg(not(feature = "bench"))]
mod interp;
#[cfg(not(feature = "bench"))]
mod kernels;
#[cfg(not(feature = "bench"))]
mod observer;
#[cfg(not(feature = "bench"))]
mod params;
#[cfg(not(feature = "bench"))]
mod tables;
#[cfg(not(feature = "bench"))]
mod util;
#[cfg(not(feature = "bench"))]
mod weighted;

pub use block::{PlaneMut, PlaneRef, RefWindow, UnitBuf, UnitBufMut};
pub use clip::{ClipRange, ClipRangeSet};
pub use error::McError;
pub use geo::{GeoPartition, geo_mask, weighted_geo_blk};
pub use interp::{InterpolationFilter, scratch_len};
pub use kernels::{KernelLevel, KernelSet, KernelSetBuilder};
pub use observer::{BandwidthObserver, ReadCounter, ReadRegion};
pub use params::{
    ChromaFormat, ComponentId, ComponentSelect, Direction, FilterVariant, RefPicList, TapFamily,
};
pub use util::Pel;
pub use weighted::{
    ComponentWeights, SliceWeights, WeightPrediction, WeightedParams, WpScalingParam,
    derive_weighting,
};

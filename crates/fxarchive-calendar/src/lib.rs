//! FXT trading calendar for the fxarchive tick archive.
//!
//! - [`offset_at`] / [`FxtClock`] - GMT to FXT offset with cached transitions
//! - [`fxt_to_gmt`] - Inverse conversion, iterated until stable
//! - [`is_non_trading`] - Weekend classification on the FXT clock
//! - [`first_trading_hour`] - Start of a symbol's tick history, rounded to an FXT day

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fxarchive/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod offset;
mod session;

pub use offset::{
    FXT_SHIFT, FxtClock, FxtOffset, Transition, fxt_offset, fxt_to_gmt, gmt_to_fxt,
    next_transition, offset_at, prev_transition, transitions_in_year,
};
pub use session::{first_trading_hour, is_non_trading, next_day_boundary};

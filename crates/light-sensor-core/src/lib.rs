//! Hardware independent pieces of the light sensor firmware: the WiFi
//! connection supervisor, the BH1750 register protocol, reading payloads,
//! timestamps and the small wire formats (SNTP, HTTP) the firmware speaks.
#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

pub mod bh1750;
pub mod http;
pub mod reading;
pub mod sntp;
pub mod supervisor;
pub mod timestamp;

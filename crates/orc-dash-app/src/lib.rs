// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod animation;
pub mod ids;
pub mod navigation;
pub mod parse;
pub mod state;
pub mod status;
pub mod view;
pub mod visibility;

pub use animation::*;
pub use ids::*;
pub use navigation::*;
pub use parse::*;
pub use state::*;
pub use status::*;
pub use view::*;
pub use visibility::*;

// Copyright (c) 2024 EconGraph. All rights reserved.
// Licensed under the Microsoft Reference Source License (MS-RSL).
// See LICENSE file for complete terms and conditions.

//! C5 star-schema loader: upserts a parsed filing's companies,
//! concepts, time periods, dimensions and facts into the warehouse
//! inside one transaction per filing, then backfills hierarchy levels
//! for any concept the taxonomy left unleveled.

pub mod dimensions;
pub mod error;
pub mod facts;
pub mod hierarchy_population;
pub mod loader;
pub mod relationships;

pub use error::{LoadError, LoadResult};
pub use loader::{load_filing, FilingHeaderInput};

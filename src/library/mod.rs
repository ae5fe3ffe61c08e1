//! Persisted knowledge bases for fabric-type reconciliation.
//!
//! Two structures survive across runs:
//! - [`VariantLibrary`]: category -> known label spellings (`mainlib.json`)
//! - [`CategoryCatalog`]: taxonomy group lists plus the flat category list
//!   (`mappingLib.json`), from which the fragment index is derived
//!
//! Both are loaded once at run start, owned by the pipeline, mutated only
//! when reviewed mappings are folded back in, and rewritten wholesale at the
//! end of the run. A missing file is an empty library; an unparsable file is
//! fatal before any mutation happens.

mod catalog;
mod variants;

pub use catalog::{CatalogUpdate, CategoryCatalog};
pub use variants::VariantLibrary;

// Crate-internal.
// ---

pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod memory_datasource;
    }
}

pub(crate) mod domain {
    pub(crate) mod entities {
        pub(crate) mod account;
        pub(crate) mod context;
        pub(crate) mod document;
        pub(crate) mod document_type;
        pub(crate) mod entry;
        pub(crate) mod period;
        pub(crate) mod settings;
    }
    pub(crate) mod logic {
        pub(crate) mod balances;
        pub(crate) mod editor;
        pub(crate) mod vat;
    }
    pub(crate) mod repositories {
        pub(crate) mod backend;
    }
    pub(crate) mod usecases {
        pub(crate) mod document_usecase;
        pub(crate) mod opening_balance_usecase;
        pub(crate) mod settlement_usecase;
        pub(crate) mod vat_change_usecase;
    }
}

// Public exports.
// ---

#[doc(hidden)]
#[allow(unused_imports)]
pub mod exports {
    // This mod represents how clients see the library, and can differ from the
    // internal structure.
    //
    // The contents of this mod are re-exported in the root of the crate.

    pub mod entities {
        pub use crate::domain::entities::account::*;
        pub use crate::domain::entities::context::*;
        pub use crate::domain::entities::document::*;
        pub use crate::domain::entities::document_type::*;
        pub use crate::domain::entities::entry::*;
        pub use crate::domain::entities::period::*;
        pub use crate::domain::entities::settings::*;
    }

    pub mod logic {
        pub use crate::domain::logic::balances::*;
        pub use crate::domain::logic::editor::*;
        pub use crate::domain::logic::vat::*;
    }

    pub mod storage {
        pub use crate::data::datasources::memory_datasource::*;
        pub use crate::domain::repositories::backend::*;
    }

    pub mod usecases {
        pub use crate::domain::usecases::document_usecase::*;
        pub use crate::domain::usecases::opening_balance_usecase::*;
        pub use crate::domain::usecases::settlement_usecase::*;
        pub use crate::domain::usecases::vat_change_usecase::*;
    }
}

//! External service integrations.

pub mod google_ads {
    pub use crate::google_ads_client::*;
    pub use crate::google_ads_models::*;
}

pub mod meta_ads {
    pub use crate::meta_ads_client::*;
}

pub mod microsoft_ads {
    pub use crate::microsoft_ads_client::*;
}

pub mod analytics {
    pub use crate::analytics_client::*;
}

pub mod webhook_models {
    pub use crate::webhook_models::*;
}

// Domain-layer modules: the sync pipeline and its shared models/errors
pub mod attribution {
    pub use crate::attribution::*;
}

pub mod adapters {
    pub use crate::adapters::*;
}

pub mod dispatcher {
    pub use crate::dispatcher::*;
}

pub mod aggregator {
    pub use crate::aggregator::*;
}

pub mod stage_transition {
    pub use crate::stage_transition::*;
}

pub mod reporter {
    pub use crate::reporter::*;
}

pub mod orchestrator {
    pub use crate::orchestrator::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}

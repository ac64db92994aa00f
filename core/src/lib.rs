pub mod assist;
pub mod model;
pub mod text;
pub mod util;
pub mod validation;
pub mod version;

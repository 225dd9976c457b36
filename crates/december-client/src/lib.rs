//! Client-side logic for the snowfall site: view controller, snowflake
//! scheduling, date presentation and the HTTP client. Rendering targets are
//! view models ([`app::Screen`]), not markup.

pub mod api;
pub mod app;
pub mod date;
pub mod season;
pub mod snowflake;
pub mod view;

pub use api::{ApiClient, ClientError};
pub use app::App;
pub use snowflake::{InvalidRange, Snowfall, Snowflake, SnowflakeConfig};
pub use view::View;

//! Toolkit-free state for a month-grid calendar widget: tagged per-day
//! events, the 42-day visible window, selection, and the render contract a
//! host UI paints from.

pub mod binder;
pub mod calendar;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod logging;
pub mod navigation;
pub mod scheduler;
pub mod selection;
pub mod tag;
pub mod text;
pub mod window;

pub use binder::{BoundEvent, CellRender, RenderDirective, WindowSnapshot};
pub use calendar::Calendar;
pub use config::CalendarConfig;
pub use error::{CalendarError, Result};
pub use event::Event;
pub use export::ExportDump;
pub use selection::SpilloverPolicy;
pub use tag::{Tag, TagPatch};
pub use window::WeekStart;

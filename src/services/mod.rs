pub mod analytics;
pub mod editor;
pub mod ordering;
pub mod renderer;

pub use analytics::{AnalyticsService, GroupBy};
pub use editor::{EditorSession, SessionState};
pub use ordering::{next_position, sort_for_editor, sort_for_public};
pub use renderer::{
    FetchState, PublicPageView, RenderGate, ViewTracker, evaluate_gate, render_editor_blocks,
};

pub mod chat;
pub mod dashboard;
pub mod kb_detail;
pub mod kbs;
pub mod settings;
pub mod shared;
pub mod vision;

pub use chat::ChatView;
pub use dashboard::DashboardView;
pub use kbs::KbsView;
pub use settings::SettingsView;
pub use vision::VisionView;

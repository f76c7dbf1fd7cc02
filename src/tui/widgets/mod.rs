pub mod auth_screen;
pub mod calendar_view;
pub mod color;
pub mod confirm_delete;
pub mod detail;
pub mod editor;
pub mod filter_bar;
pub mod form;
pub mod help;
pub mod item_list;
pub mod note_list;
pub mod sidebar;
pub mod stats_view;
pub mod status_bar;
pub mod tabs;
pub mod task_list;

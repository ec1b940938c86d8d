use crate::types::ThemeMode;

pub struct ThemeDefinition {
    pub css: &'static str,
}

pub fn theme_definition(mode: ThemeMode) -> ThemeDefinition {
    match mode {
        ThemeMode::Dark => ThemeDefinition { css: DARK_THEME },
        ThemeMode::Light => ThemeDefinition { css: LIGHT_THEME },
    }
}

const DARK_THEME: &str = r#"
:root {
    --color-bg-primary: #0b0b10;
    --color-bg-secondary: #12121a;
    --color-bg-overlay: rgba(5, 5, 10, 0.82);
    --color-text-primary: #f4f4f5;
    --color-text-muted: #a1a1aa;
    --color-border: rgba(255, 255, 255, 0.1);
    --color-surface: rgba(255, 255, 255, 0.03);
    --color-surface-hover: rgba(255, 255, 255, 0.07);
    --color-accent: #818cf8;
    --color-accent-soft: rgba(99, 102, 241, 0.16);
    --color-accent-border: rgba(129, 140, 248, 0.25);
    --color-danger-soft: rgba(239, 68, 68, 0.12);
    --color-danger-border: rgba(248, 113, 113, 0.25);
    --color-input-bg: rgba(0, 0, 0, 0.3);
    --color-chat-user-bg: rgba(99, 102, 241, 0.16);
    --color-chat-assistant-bg: rgba(24, 24, 32, 0.6);
    --color-online: #34d399;
    --color-offline: #f87171;
    --color-shimmer-base: rgba(129, 140, 248, 0.25);
    --color-shimmer-highlight: #a5b4fc;
}
body { background: var(--color-bg-primary); color: var(--color-text-primary); }
"#;

const LIGHT_THEME: &str = r#"
:root {
    --color-bg-primary: #f8f8fb;
    --color-bg-secondary: #ffffff;
    --color-bg-overlay: rgba(250, 250, 252, 0.85);
    --color-text-primary: #18181b;
    --color-text-muted: #52525b;
    --color-border: rgba(0, 0, 0, 0.12);
    --color-surface: rgba(0, 0, 0, 0.03);
    --color-surface-hover: rgba(0, 0, 0, 0.06);
    --color-accent: #4f46e5;
    --color-accent-soft: rgba(79, 70, 229, 0.1);
    --color-accent-border: rgba(79, 70, 229, 0.28);
    --color-danger-soft: rgba(220, 38, 38, 0.08);
    --color-danger-border: rgba(220, 38, 38, 0.25);
    --color-input-bg: #ffffff;
    --color-chat-user-bg: rgba(79, 70, 229, 0.1);
    --color-chat-assistant-bg: #ffffff;
    --color-online: #059669;
    --color-offline: #dc2626;
    --color-shimmer-base: rgba(79, 70, 229, 0.2);
    --color-shimmer-highlight: #6366f1;
}
body { background: var(--color-bg-primary); color: var(--color-text-primary); }
"#;

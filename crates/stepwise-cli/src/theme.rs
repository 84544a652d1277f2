use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// Theme for the confirmation prompts, matching the `→` / `✓` output style
pub fn dialoguer_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_style: Style::new().bold(),
        prompt_prefix: style("?".to_string()).yellow().bold(),
        success_prefix: style("✓".to_string()).green().bold(),
        error_prefix: style("✖".to_string()).red().bold(),
        defaults_style: Style::new().dim(),
        hint_style: Style::new().dim(),
        values_style: Style::new().cyan(),
        ..Default::default()
    }
}

use anyhow::Result;

use super::args::ThresholdsCliArgs;
use crate::agenda::format_clock;
use crate::timing::{compute_thresholds, RoleCategory, TimerConfig};

pub fn handle_thresholds_command(args: ThresholdsCliArgs) -> Result<()> {
    let category: RoleCategory = args.category.parse()?;
    let config = compute_thresholds(category, args.minutes)?;
    print!("{}", render_thresholds(category, args.minutes, &config));
    Ok(())
}

pub fn render_thresholds(category: RoleCategory, minutes: f64, config: &TimerConfig) -> String {
    let shown = config.clamped();
    format!(
        "{} min {}\n  green  {}\n  yellow {}\n  red    {}\n  bell   {}\n",
        minutes,
        category,
        format_clock(shown.green as f64),
        format_clock(shown.yellow as f64),
        format_clock(shown.red as f64),
        format_clock(shown.bell as f64)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_speech_thresholds() {
        let config = compute_thresholds(RoleCategory::Speech, 7.0).unwrap();
        let text = render_thresholds(RoleCategory::Speech, 7.0, &config);
        assert_eq!(
            text,
            "7 min speech\n  green  5:00\n  yellow 6:00\n  red    7:00\n  bell   7:30\n"
        );
    }
}

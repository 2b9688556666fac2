//! Terminal styling for command summaries.

/// Section heading, bold cyan when colors are enabled
pub fn heading(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        console::style(text).bold().cyan().to_string()
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}

/// Field label, bold when colors are enabled
pub fn label(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        console::style(text).bold().to_string()
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}

use crate::fiber::ComponentInfo;
use crate::settings::PickerSettings;

/// Bundler prefixes removed from the front of a path, applied in order
const BUNDLER_PREFIXES: &[&str] =
    &["webpack-internal:///", "webpack:///", "/app-pages-browser/", "(app-pages-browser)/", "./"];

/// Conventional source roots, in priority order
const SOURCE_ROOT_MARKERS: &[&str] = &["src/", "app/", "components/", "pages/", "lib/"];

/// Turn a bundler path or URL into a readable project-relative path
pub fn clean_path(file_path: &str) -> String {
    let mut cleaned = file_path;
    for prefix in BUNDLER_PREFIXES {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest;
        }
    }

    if let Some(query) = cleaned.find('?') {
        cleaned = &cleaned[..query];
    }

    for marker in SOURCE_ROOT_MARKERS {
        if let Some(idx) = cleaned.find(marker) {
            return cleaned[idx..].to_string();
        }
    }

    cleaned.to_string()
}

/// `path:line`, with the line dropped when unknown
pub fn path_with_line(file_name: &str, line_number: Option<u32>) -> String {
    let path = clean_path(file_name);
    match line_number.filter(|l| *l > 0) {
        Some(line) => format!("{}:{}", path, line),
        None => path,
    }
}

/// `path:line` for a component, using the owner fallback when it has no source of its own
pub fn format_location(component: &ComponentInfo) -> Option<String> {
    match (&component.file_name, &component.owner_file_name) {
        (Some(file_name), _) => Some(path_with_line(file_name, component.line_number)),
        (None, Some(owner_file)) => Some(path_with_line(owner_file, component.owner_line_number)),
        (None, None) => None,
    }
}

/// `Name (path:line)`, or just `Name` when nothing is known about its source
pub fn format_component(component: &ComponentInfo) -> String {
    match format_location(component) {
        Some(location) => format!("{} ({})", component.name, location),
        None => component.name.clone(),
    }
}

/// Clipboard text for a resolved chain
pub fn format_copy_text(
    components: &[ComponentInfo],
    settings: &PickerSettings,
    content: Option<&str>,
    props: Option<&str>,
    page_url: &str,
) -> String {
    let Some(primary) = components.first() else {
        return String::new();
    };

    let mut text = format_component(primary);
    if let Some(props) = props.filter(|p| !p.is_empty()) {
        text.push(' ');
        text.push_str(props);
    }

    if settings.include_parent_chain {
        for parent in components.iter().skip(1).take(settings.parent_chain_depth as usize) {
            text.push_str("\n  in ");
            text.push_str(&format_component(parent));
        }
    }

    if let Some(content) = content.filter(|c| !c.is_empty()) {
        text.push_str(&format!("\n\n```html\n{}\n```", content));
    }

    if settings.include_page_url {
        text.push_str(&format!("\n\nPage: {}", page_url));
    }

    text
}

/// Sample of the copied text for the given settings
pub fn preview_text(settings: &PickerSettings) -> String {
    let sample = [
        ComponentInfo {
            file_name: Some("path/to/file.tsx".to_string()),
            line_number: Some(23),
            ..ComponentInfo::new("ComponentName")
        },
        ComponentInfo {
            file_name: Some("path/to/Parent.tsx".to_string()),
            line_number: Some(45),
            ..ComponentInfo::new("ParentComponent")
        },
        ComponentInfo {
            file_name: Some("path/to/Grandparent.tsx".to_string()),
            line_number: Some(12),
            ..ComponentInfo::new("GrandparentComponent")
        },
        ComponentInfo {
            file_name: Some("app/layout.tsx".to_string()),
            line_number: Some(8),
            ..ComponentInfo::new("AppLayout")
        },
    ];

    format_copy_text(&sample, settings, None, None, "http://localhost:3000/app/planner")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiber::SourceLocation;

    fn located(name: &str, file: &str, line: u32) -> ComponentInfo {
        ComponentInfo::new(name).with_source(SourceLocation::new(file, Some(line), Some(1)))
    }

    fn chain() -> Vec<ComponentInfo> {
        vec![
            located("Button", "webpack-internal:///./src/components/Button.tsx", 12),
            located("Toolbar", "/home/me/project/src/Toolbar.tsx", 40),
            located("App", "./app/page.tsx", 3),
        ]
    }

    #[test]
    fn test_clean_path_webpack_internal() {
        assert_eq!(clean_path("webpack-internal:///./src/components/Button.tsx"), "src/components/Button.tsx");
    }

    #[test]
    fn test_clean_path_without_marker_only_strips_prefixes() {
        assert_eq!(clean_path("webpack-internal:///./widgets/Thing.tsx"), "widgets/Thing.tsx");
        assert_eq!(clean_path("/opt/build/Thing.tsx"), "/opt/build/Thing.tsx");
    }

    #[test]
    fn test_clean_path_next_app_prefixes_and_query() {
        assert_eq!(clean_path("(app-pages-browser)/./app/dashboard/page.tsx"), "app/dashboard/page.tsx");
        assert_eq!(clean_path("/app-pages-browser/./components/Nav.tsx?v=123"), "components/Nav.tsx");
        assert_eq!(clean_path("http://localhost:5173/src/main.tsx?t=1700000000"), "src/main.tsx");
    }

    #[test]
    fn test_clean_path_marker_priority() {
        // `src/` wins over an earlier `lib/`
        assert_eq!(clean_path("/repo/lib/pkg/src/index.ts"), "src/index.ts");
    }

    #[test]
    fn test_format_component() {
        assert_eq!(format_component(&chain()[0]), "Button (src/components/Button.tsx:12)");
        assert_eq!(format_component(&ComponentInfo::new("Anonymous")), "Anonymous");

        let no_line = ComponentInfo::new("X").with_source(SourceLocation::new("src/X.tsx", None, None));
        assert_eq!(format_component(&no_line), "X (src/X.tsx)");
    }

    #[test]
    fn test_format_component_with_owner_fallback() {
        let info =
            ComponentInfo::new("div").with_owner(Some("Card".to_string()), SourceLocation::new("src/Card.tsx", Some(9), None));
        assert_eq!(format_component(&info), "div (src/Card.tsx:9)");

        let unnamed_owner = ComponentInfo::new("Inner").with_owner(None, SourceLocation::new("src/Card.tsx", None, None));
        assert_eq!(format_component(&unnamed_owner), "Inner (src/Card.tsx)");
    }

    #[test]
    fn test_copy_text_uses_owner_path_for_sourceless_primary() {
        let chain = vec![
            ComponentInfo::new("Inner").with_owner(Some("Card".to_string()), SourceLocation::new("src/Card.tsx", Some(9), None)),
            located("Card", "src/Card.tsx", 9),
        ];
        let settings = PickerSettings::default().parent_chain(false, 3);
        assert_eq!(format_copy_text(&chain, &settings, None, None, ""), "Inner (src/Card.tsx:9)");
    }

    #[test]
    fn test_copy_text_three_lines() {
        let settings = PickerSettings::default().parent_chain(true, 2).page_url(false);
        let text = format_copy_text(&chain(), &settings, None, None, "http://localhost:3000/");

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Button (src/components/Button.tsx:12)",
                "  in Toolbar (src/Toolbar.tsx:40)",
                "  in App (app/page.tsx:3)",
            ]
        );
    }

    #[test]
    fn test_copy_text_depth_limits_ancestors() {
        let settings = PickerSettings::default().parent_chain(true, 1);
        let text = format_copy_text(&chain(), &settings, None, None, "");
        assert_eq!(text.lines().count(), 2);

        let settings = PickerSettings::default().parent_chain(true, 0);
        assert_eq!(format_copy_text(&chain(), &settings, None, None, "").lines().count(), 1);
    }

    #[test]
    fn test_copy_text_without_parent_chain() {
        let settings = PickerSettings::default().parent_chain(false, 3);
        let text = format_copy_text(&chain(), &settings, None, None, "");
        assert_eq!(text, "Button (src/components/Button.tsx:12)");
    }

    #[test]
    fn test_copy_text_full_layout() {
        let settings = PickerSettings::default().parent_chain(true, 1).page_url(true);
        let text = format_copy_text(
            &chain(),
            &settings,
            Some("<button>Save</button>"),
            Some("{variant: \"primary\"}"),
            "http://localhost:3000/settings",
        );

        assert_eq!(
            text,
            "Button (src/components/Button.tsx:12) {variant: \"primary\"}\n  in Toolbar (src/Toolbar.tsx:40)\n\n```html\n<button>Save</button>\n```\n\nPage: http://localhost:3000/settings"
        );
    }

    #[test]
    fn test_copy_text_empty_chain() {
        assert_eq!(format_copy_text(&[], &PickerSettings::default(), Some("<p/>"), None, ""), "");
    }

    #[test]
    fn test_preview_text() {
        let settings = PickerSettings::default().parent_chain(true, 2).page_url(true);
        assert_eq!(
            preview_text(&settings),
            "ComponentName (path/to/file.tsx:23)\n  in ParentComponent (path/to/Parent.tsx:45)\n  in GrandparentComponent (path/to/Grandparent.tsx:12)\n\nPage: http://localhost:3000/app/planner"
        );
    }
}

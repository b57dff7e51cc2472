//! Command-line arguments accepted by the desktop binary.

use jotter_core::viewer::ReadRoute;

/// Read-mode route requested at launch, if any.
///
/// Accepts a share link (`...?note=<id>&mode=read`) or `--note <id>`.
/// Anything else starts the workspace.
pub fn launch_route<I>(args: I) -> Option<ReadRoute>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--note" {
            return args.next().as_deref().and_then(ReadRoute::for_note);
        }
        if let Some(id) = arg.strip_prefix("--note=") {
            return ReadRoute::for_note(id);
        }
        if let Some(route) = ReadRoute::parse(&arg) {
            return Some(route);
        }
    }
    None
}

/// Launch context injected into the root component.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub read_route: Option<ReadRoute>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn share_link_argument_opens_read_mode() {
        let route = launch_route(args(&["jotter://app/?note=abc&mode=read"])).unwrap();
        assert_eq!(route.requested_id(), "abc");
    }

    #[test]
    fn note_flag_opens_read_mode() {
        assert_eq!(
            launch_route(args(&["--note", "abc"])).map(|route| route.requested_id().to_string()),
            Some("abc".to_string())
        );
        assert_eq!(
            launch_route(args(&["--note=xyz"])).map(|route| route.requested_id().to_string()),
            Some("xyz".to_string())
        );
        assert!(launch_route(args(&["--note"])).is_none());
    }

    #[test]
    fn other_arguments_start_the_workspace() {
        assert!(launch_route(args(&[])).is_none());
        assert!(launch_route(args(&["https://notes.example.com/?note=abc"])).is_none());
        assert!(launch_route(args(&["--verbose"])).is_none());
    }
}

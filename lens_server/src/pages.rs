//! Inline HTML pages of the dashboard app.
//!
use common::protocol::DetectionResult;

/// Landing page.
pub const LANDING_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>NrityaLens</title>
<style>
  body { background: #000; color: #fff; font-family: sans-serif; margin: 2rem auto; max-width: 48rem; }
  h1.brand { color: #f97316; font-size: 3rem; margin-bottom: 0.2rem; }
  p.tagline { color: #aaa; font-size: 1.2rem; }
  section { background: #111827; border-radius: 8px; padding: 1rem 2rem; margin: 1.5rem 0; }
  a.button-primary { display: inline-block; background: #f97316; color: #000; padding: 0.6rem 1.4rem; border-radius: 6px; text-decoration: none; font-weight: bold; }
  footer { color: #aaa; margin-top: 2rem; }
</style>
</head>
<body>
<header>
<h1 class="brand">NrityaLens</h1>
<p class="tagline">Discover the beauty of Bharatanatyam through AI lens.</p>
</header>
<section>
<h2>Features</h2>
<ul>
<li>Detect mudras from photos, videos, or live camera input.</li>
<li>Learn about classical Bharatanatyam mudras with descriptions.</li>
<li>Interactive, easy-to-use interface for all levels.</li>
<li>Powered by AI gesture recognition models.</li>
<li>Supports accessibility and high-contrast mode.</li>
</ul>
</section>
<section>
<h2>How it Works</h2>
<p>Upload a photo, record a video, or use your live camera feed. Our AI
engine analyzes hand gestures and identifies the corresponding mudra with
confidence levels and educational insights.</p>
<a href="/dash" class="button-primary">Get Started</a>
</section>
<footer>&copy; NrityaLens &bull; Preserve tradition with AI</footer>
</body>
</html>
"#;

const PAGE_STYLE: &str = r#"<style>
  body { background: #000; color: #fff; font-family: sans-serif; margin: 2rem auto; max-width: 48rem; }
  h1 { color: #f97316; }
  img.media { max-width: 100%; }
  .drag-drop { background: #111827; color: #fff; padding: 2rem; text-align: center; cursor: pointer; border-radius: 8px; }
  p.separator { color: #aaa; text-align: center; }
  button.record { background: #888; color: #fff; border: none; padding: 0.6rem 1.4rem; border-radius: 6px; cursor: pointer; }
  button.record.on { background: #4caf50; }
  iframe { width: 100%; height: 16rem; border: none; }
  footer { color: #aaa; margin-top: 2rem; }
</style>"#;

const DROP_ZONE: &str = r#"<form id="upload-form" action="/upload" method="post" enctype="multipart/form-data">
<div id="drop-zone" class="drag-drop">
<p>Drag &amp; Drop an image or click to upload</p>
<input type="file" name="file" id="file-input" accept="image/*" style="display: none">
</div>
</form>
<script>
  const zone = document.getElementById("drop-zone");
  const input = document.getElementById("file-input");
  const form = document.getElementById("upload-form");
  zone.addEventListener("click", () => input.click());
  input.addEventListener("change", () => {
    if (input.files.length > 0) {
      form.submit();
    }
  });
  zone.addEventListener("dragover", (event) => event.preventDefault());
  zone.addEventListener("drop", (event) => {
    event.preventDefault();
    if (event.dataTransfer.files.length > 0) {
      input.files = event.dataTransfer.files;
      form.submit();
    }
  });
</script>"#;

const FRAGMENT_STYLE: &str = r#"<style>
  body { background: #000; font-family: sans-serif; }
  p.placeholder { color: #fff; }
  p.prediction { color: #f97316; font-size: 2.5rem; margin-bottom: 10px; }
  p.distance { color: grey; font-size: small; }
  p.description { color: #fff; }
  p.error { color: red; }
</style>"#;

/// Dashboard page: live view while recording, otherwise the upload box.
pub fn dashboard_page(recording: bool) -> String {
    let media = if recording {
        r#"<img src="/stream" alt="Live camera" class="media">"#.to_owned()
    } else {
        DROP_ZONE.to_owned()
    };
    let (toggle_label, toggle_class) = if recording {
        ("Stop Recording", "record on")
    } else {
        ("Start Recording", "record")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>NrityaLens</title>
{PAGE_STYLE}
</head>
<body>
<h1>NrityaLens</h1>
{media}
<p class="separator">OR</p>
<form action="/record" method="post">
<button type="submit" class="{toggle_class}">{toggle_label}</button>
</form>
<iframe src="/result" title="Latest result"></iframe>
<footer>&copy; NrityaLens &bull; Preserve tradition with AI</footer>
</body>
</html>
"#
    )
}

/// Latest-result fragment embedded by the dashboard; reloads itself while a
/// recording session runs.
pub fn result_fragment(recording: bool, result: Option<&DetectionResult>) -> String {
    let reload = if recording {
        r#"<meta http-equiv="refresh" content="2">"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
{reload}
{FRAGMENT_STYLE}
</head>
<body>
{body}
</body>
</html>
"#,
        body = result_body(result),
    )
}

fn result_body(result: Option<&DetectionResult>) -> String {
    let Some(result) = result else {
        return r#"<p class="placeholder">No result yet</p>"#.to_owned();
    };

    match result {
        DetectionResult::Detection {
            prediction,
            description,
            ..
        } => {
            let mut body = format!(
                r#"<p class="prediction"><strong>{}</strong></p>"#,
                escape_html(prediction)
            );
            if let Some(distance) = result.distance_display() {
                body.push_str(&format!(
                    r#"
<p class="distance">Distance: {distance}</p>"#
                ));
            }
            if let Some(description) = description {
                body.push_str(&format!(
                    r#"
<p class="description">{}</p>"#,
                    escape_html(description)
                ));
            }
            body
        }
        DetectionResult::Failure { error } => {
            format!(r#"<p class="error">&#10060; {}</p>"#, escape_html(error))
        }
    }
}

/// Escape text coming from the detection endpoint or an upload.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn landing_links_to_the_dashboard() {
        assert!(LANDING_HTML.contains(r#"href="/dash""#));
        assert!(LANDING_HTML.contains("NrityaLens"));
        assert!(LANDING_HTML.contains("Bharatanatyam"));
    }

    #[test]
    fn idle_dashboard_offers_upload_and_start() {
        let page = dashboard_page(false);
        assert!(page.contains(r#"action="/upload""#));
        assert!(page.contains("Start Recording"));
        assert!(!page.contains(r#"src="/stream""#));
    }

    #[test]
    fn recording_dashboard_shows_the_live_stream() {
        let page = dashboard_page(true);
        assert!(page.contains(r#"src="/stream""#));
        assert!(page.contains("Stop Recording"));
        assert!(!page.contains(r#"action="/upload""#));
    }

    #[test]
    fn fragment_shows_placeholder_without_result() {
        let html = result_fragment(false, None);
        assert!(html.contains("No result yet"));
        assert!(!html.contains("http-equiv"));
    }

    #[test]
    fn fragment_reloads_only_while_recording() {
        assert!(result_fragment(true, None).contains(r#"http-equiv="refresh" content="2""#));
        assert!(!result_fragment(false, None).contains("http-equiv"));
    }

    #[test]
    fn detection_renders_prediction_distance_and_description() {
        let result = DetectionResult::Detection {
            prediction: "Pataka".to_owned(),
            distance: Some(0.1239),
            description: Some("The flag hand.".to_owned()),
        };

        let html = result_fragment(true, Some(&result));

        assert!(html.contains("Pataka"));
        assert!(html.contains("Distance: 0.124"));
        assert!(html.contains("The flag hand."));
    }

    #[test]
    fn zero_distance_is_still_rendered() {
        let result = DetectionResult::Detection {
            prediction: "Pataka".to_owned(),
            distance: Some(0.0),
            description: None,
        };

        assert!(result_fragment(true, Some(&result)).contains("Distance: 0.000"));
    }

    #[test]
    fn missing_distance_is_omitted() {
        let result = DetectionResult::Detection {
            prediction: "Pataka".to_owned(),
            distance: None,
            description: None,
        };

        assert!(!result_fragment(true, Some(&result)).contains("Distance:"));
    }

    #[test]
    fn failure_renders_the_error_message() {
        let result = DetectionResult::failure("HTTP 500 - Internal Server Error");

        let html = result_fragment(false, Some(&result));

        assert!(html.contains("HTTP 500 - Internal Server Error"));
    }

    #[test]
    fn endpoint_text_is_escaped() {
        let result = DetectionResult::failure("<script>alert(1)</script>");

        let html = result_fragment(false, Some(&result));

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }
}

// Server-rendered HTML.
//
// The UI is two pages: an intake form with a MediaRecorder widget, and the
// result view with the attributed transcript and the bulleted summary.

use crate::pipeline::RecapResult;

const PAGE_STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
    h1 { font-size: 1.4rem; }
    h2 { font-size: 1.1rem; margin-top: 2rem; }
    fieldset { border: 1px solid #ccc; border-radius: 6px; margin-bottom: 1.5rem; padding: 1rem; }
    button { padding: 0.4rem 1rem; }
    pre { background: #f6f6f6; padding: 1rem; border-radius: 6px; white-space: pre-wrap; }
    .utterance { margin: 0.3rem 0; }
    .speaker { font-weight: 600; margin-right: 0.4rem; }
    .time { color: #888; font-size: 0.85em; margin-right: 0.4rem; }
    .muted { color: #888; }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        style = PAGE_STYLE,
        body = body,
    )
}

/// The intake form: file upload plus an in-browser recorder that posts the
/// captured audio to /record-audio/.
pub fn index_page() -> String {
    let body = r#"<h1>Recap</h1>
<p>Upload or record audio to get a transcript and a bulleted summary.</p>

<fieldset>
<legend>Upload a file</legend>
<form action="/upload-audio/" method="post" enctype="multipart/form-data">
  <input type="file" name="file" required>
  <button type="submit">Transcribe &amp; summarize</button>
</form>
</fieldset>

<fieldset>
<legend>Record in the browser</legend>
<button id="record">Start recording</button>
<span id="status" class="muted"></span>
<script>
let recorder = null;
let pieces = [];
const button = document.getElementById('record');
const status = document.getElementById('status');

button.addEventListener('click', async () => {
  if (recorder && recorder.state === 'recording') {
    recorder.stop();
    return;
  }
  const stream = await navigator.mediaDevices.getUserMedia({ audio: true });
  pieces = [];
  recorder = new MediaRecorder(stream);
  recorder.addEventListener('dataavailable', (e) => pieces.push(e.data));
  recorder.addEventListener('stop', async () => {
    stream.getTracks().forEach((t) => t.stop());
    status.textContent = 'Processing… this can take a while.';
    const form = new FormData();
    form.append('audio_data', new Blob(pieces), 'recorded_audio.wav');
    const response = await fetch('/record-audio/', { method: 'POST', body: form });
    document.open();
    document.write(await response.text());
    document.close();
  });
  recorder.start();
  button.textContent = 'Stop recording';
  status.textContent = 'Recording…';
});
</script>
</fieldset>
"#;
    page("Recap", body)
}

/// The result view: attributed transcript plus summary bullets.
pub fn result_page(result: &RecapResult) -> String {
    let mut body = String::from("<h1>Recap</h1>\n<h2>Transcript</h2>\n");

    if result.utterances.is_empty() {
        body.push_str("<p class=\"muted\">No speech was detected.</p>\n");
    } else {
        for utterance in &result.utterances {
            body.push_str("<p class=\"utterance\">");
            body.push_str(&format!(
                "<span class=\"time\">[{:.1}s&ndash;{:.1}s]</span>",
                utterance.start, utterance.end
            ));
            if let Some(speaker) = &utterance.speaker {
                body.push_str(&format!(
                    "<span class=\"speaker\">{}:</span>",
                    escape_html(speaker)
                ));
            }
            body.push_str(&escape_html(&utterance.text));
            body.push_str("</p>\n");
        }
    }

    body.push_str("<h2>Summary</h2>\n");
    if result.bullets.is_empty() {
        body.push_str("<p class=\"muted\">Nothing to summarize.</p>\n");
    } else {
        body.push_str(&format!("<pre>{}</pre>\n", escape_html(&result.bullets)));
    }

    body.push_str("<p><a href=\"/\">Process another file</a></p>\n");
    page("Recap - result", &body)
}

/// Minimal HTML escaping for text interpolated into the pages.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::Utterance;

    fn sample_result() -> RecapResult {
        RecapResult {
            utterances: vec![
                Utterance {
                    speaker: Some("Speaker 1".to_string()),
                    start: 0.0,
                    end: 2.0,
                    text: "hello <world>".to_string(),
                },
                Utterance {
                    speaker: None,
                    start: 2.0,
                    end: 4.0,
                    text: "goodbye".to_string(),
                },
            ],
            summary: "Hello world. Goodbye.".to_string(),
            bullets: "- Hello world.\n- Goodbye.".to_string(),
        }
    }

    #[test]
    fn escaping_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"A" & 'B'</b>"#),
            "&lt;b&gt;&quot;A&quot; &amp; &#39;B&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn index_page_has_both_intake_forms() {
        let html = index_page();
        assert!(html.contains("action=\"/upload-audio/\""));
        assert!(html.contains("name=\"file\""));
        assert!(html.contains("/record-audio/"));
        assert!(html.contains("audio_data"));
    }

    #[test]
    fn result_page_escapes_transcript_text() {
        let html = result_page(&sample_result());
        assert!(html.contains("hello &lt;world&gt;"));
        assert!(!html.contains("hello <world>"));
    }

    #[test]
    fn result_page_shows_speakers_and_bullets() {
        let html = result_page(&sample_result());
        assert!(html.contains("Speaker 1:"));
        assert!(html.contains("- Hello world."));
        assert!(html.contains("- Goodbye."));
    }

    #[test]
    fn empty_result_renders_placeholders() {
        let html = result_page(&RecapResult {
            utterances: Vec::new(),
            summary: String::new(),
            bullets: String::new(),
        });
        assert!(html.contains("No speech was detected."));
        assert!(html.contains("Nothing to summarize."));
    }
}

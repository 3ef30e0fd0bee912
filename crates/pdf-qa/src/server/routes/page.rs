//! HTML rendering for the question form

use std::fmt::Write;

/// Page heading
pub const TITLE: &str = "PDF Document Question Answering";

/// Text under the heading
pub const DESCRIPTION: &str = "Upload a PDF document and ask any question. \
The chatbot will try to answer using the provided document.";

/// What the page shows after a submission
#[derive(Debug, Clone, Default)]
pub struct PageView {
    /// Question echoed back into the input
    pub question: String,
    /// Answer or error text for the response area
    pub response: String,
    /// Pages the answer drew on
    pub cited_pages: Vec<u32>,
    /// Whether `response` holds an error
    pub is_error: bool,
}

impl PageView {
    /// A successful answer
    pub fn answer(question: &str, response: String, cited_pages: Vec<u32>) -> Self {
        Self {
            question: question.to_string(),
            response,
            cited_pages,
            is_error: false,
        }
    }

    /// A failure shown in place of the answer
    pub fn error(question: &str, message: String) -> Self {
        Self {
            question: question.to_string(),
            response: message,
            cited_pages: Vec::new(),
            is_error: true,
        }
    }
}

/// Render the full page
pub fn render(view: &PageView) -> String {
    let mut sources = String::new();
    if !view.cited_pages.is_empty() {
        let pages: Vec<String> = view.cited_pages.iter().map(|p| p.to_string()).collect();
        let _ = write!(
            sources,
            "\n      <p class=\"sources\">Sources: page {}</p>",
            pages.join(", ")
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
      body {{ font-family: sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }}
      label {{ display: block; font-weight: bold; margin-top: 1rem; }}
      textarea {{ width: 100%; box-sizing: border-box; }}
      .error {{ color: #b00020; }}
      .sources {{ color: #555; }}
    </style>
  </head>
  <body>
    <h1>{title}</h1>
    <p>{description}</p>
    <form method="post" action="/" enctype="multipart/form-data">
      <label for="file">Upload PDF File</label>
      <input type="file" id="file" name="file" accept=".pdf">
      <label for="question">Input Query</label>
      <textarea id="question" name="question" rows="2" placeholder="Type your question here...">{question}</textarea>
      <p><button type="submit">Submit</button></p>
    </form>
    <section>
      <label for="response">Response</label>
      <textarea id="response" rows="10" readonly{class}>{response}</textarea>{sources}
    </section>
  </body>
</html>
"#,
        title = escape_html(TITLE),
        description = escape_html(DESCRIPTION),
        question = escape_html(&view.question),
        class = if view.is_error { r#" class="error""# } else { "" },
        response = escape_html(&view.response),
        sources = sources,
    )
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_empty_form() {
        let html = render(&PageView::default());
        assert!(html.contains(TITLE));
        assert!(html.contains(r#"accept=".pdf""#));
        assert!(html.contains(r#"name="question" rows="2""#));
        assert!(html.contains("readonly"));
        assert!(!html.contains("Sources:"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let view = PageView::answer(
            "<b>sky?</b>",
            "It is <blue>".to_string(),
            vec![1, 3],
        );
        let html = render(&view);
        assert!(html.contains("&lt;b&gt;sky?&lt;/b&gt;"));
        assert!(html.contains("It is &lt;blue&gt;"));
        assert!(!html.contains("<blue>"));
        assert!(html.contains("Sources: page 1, 3"));
    }

    #[test]
    fn test_error_marked() {
        let html = render(&PageView::error("q", "LoadError: bad".to_string()));
        assert!(html.contains(r#"class="error""#));
        assert!(html.contains("LoadError: bad"));
    }
}

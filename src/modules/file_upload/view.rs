use crate::utils::escape_html;

/// Upload page, optionally listing form errors above the field.
pub fn render_upload_form(errors: &[String]) -> String {
    let error_list = if errors.is_empty() {
        String::new()
    } else {
        let items: String =
            errors.iter().map(|e| format!("      <li>{}</li>\n", escape_html(e))).collect();
        format!("    <ul class=\"errorlist\">\n{items}    </ul>\n")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Upload a file</title>
</head>
<body>
  <h1>Upload a file</h1>
  <form method="post" action="/" enctype="multipart/form-data">
{error_list}    <label for="id_file">File:</label>
    <input type="file" name="file" id="id_file" required>
    <button type="submit">Upload</button>
  </form>
</body>
</html>
"#
    )
}

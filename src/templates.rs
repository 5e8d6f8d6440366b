//! Sample HTML documents for tests and the `--demo` command.

use crate::fonts::FontFamily;
use crate::header_footer::{Align, FontStyle, HeaderFooter};
use crate::options::Html2PdfOptions;

/// A 1×1 PNG used when the demo is rendered without an image file.
pub const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Options used by the demonstration document: a centred, decorated footer
/// lifted 50 pt with a shortened rule, and a left-aligned dingbat header.
pub fn demo_options() -> Html2PdfOptions {
    let footer = HeaderFooter {
        font_family: FontFamily::Helvetica,
        font_style: FontStyle {
            bold: true,
            italic: true,
            underline: true,
            strikethrough: true,
        },
        y_correct: 50.0,
        align: Align::Center,
        line: true,
        line_x_correct: 100.0,
        ..HeaderFooter::with_text("Cañón and Page {pN}.")
    };
    let header = HeaderFooter {
        font_family: FontFamily::ZapfDingbats,
        font_size: 20.0,
        align: Align::Left,
        line: true,
        ..HeaderFooter::with_text("Page {pN}")
    };
    Html2PdfOptions::default()
        .with_title("html2pdf demo")
        .with_header(header)
        .with_footer(footer)
}

/// Two-page document touching every supported construct: a `<style>`
/// block, indented and shifted paragraphs, an image, a table with repeated
/// header, a forced page break and a nested over-wide table.
pub fn demo_template(image_src: Option<&str>) -> String {
    let (src, size) = match image_src {
        Some(src) => (src, ""),
        None => (PIXEL_PNG, " width='32' height='32'"),
    };
    format!(
        r##"<html>
<head>
<style>
  body {{ color: #000080 }}
  p {{ indent: 40px }}
  th {{ border-bottom-width: 1px }}
</style>
</head>
<body style="font-family: times; font-size: 10px">
<p style="margin-left: 100px">H<b>e</b>llo!</p>
<p style="text-align: left"><img src="{src}"{size}/></p>
<table style="repeat-header: yes">
  <tr><th>Surname and name</th><th>Grade</th></tr>
  <tr><td>Martín, José</td><td align="right">3,04</td></tr>
  <tr><td>Fernández, Federico</td><td align="right">8,70</td></tr>
</table>
<p>Arañazo al avión</p>
<span style="page-break-before: always"></span>
<table style="width: 110%">
  <tr>
    <td>
      <table style="border: 1px; repeat-header: yes">
        <tr><th width="200">Name</th><th width="200">Age</th></tr>
        <tr><td style="border: 0px">Peter</td><td>33</td></tr>
      </table>
    </td>
    <td style="width: 300px"></td>
  </tr>
</table>
<p style="margin-left: 200px">Text with a left margin</p>
</body>
</html>"##
    )
}

/// Report with headings, inline styling and lists.
pub fn report_template() -> &'static str {
    r##"
<div>
    <h1 style="color: #1a365d">Quarterly Report</h1>
    <p style="color: gray">Q4 - <b>Confidential</b></p>

    <h2>Summary</h2>
    <p>
        Revenue grew by <b style="color: green">23%</b> year over year,
        reaching <b>$4.2M</b> for the quarter, with
        <i>notable wins in the enterprise segment</i>.
    </p>

    <h2>Highlights</h2>
    <ul>
        <li>Customer acquisition cost reduced by 15%</li>
        <li>Net promoter score improved to 72</li>
        <li>Three new partnerships signed</li>
    </ul>

    <h2>Next steps</h2>
    <ol>
        <li>Expand the sales team</li>
        <li>Ship the reporting module</li>
    </ol>
    <hr>
    <p style="font-size: 8px; text-align: center">Generated by html2pdf</p>
</div>
"##
}

/// `paragraphs` numbered paragraphs, enough to span pages.
pub fn multi_page_template(paragraphs: usize) -> String {
    let mut html = String::from("<h1>Long document</h1>\n");
    for i in 1..=paragraphs {
        html.push_str(&format!(
            "<p>Paragraph {i}. Lorem ipsum dolor sit amet, consectetur adipiscing \
             elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.</p>\n"
        ));
    }
    html
}

/// A table of `rows` data rows under a header row that repeats on every
/// page.
pub fn long_table_template(rows: usize) -> String {
    let mut html = String::from(
        "<table border=\"1\" style=\"repeat-header: yes\">\n\
         <thead><tr><th>Item</th><th>Quantity</th><th>Price</th></tr></thead>\n<tbody>\n",
    );
    for i in 1..=rows {
        html.push_str(&format!(
            "<tr><td>Item {i}</td><td align=\"right\">{}</td><td align=\"right\">{}.00</td></tr>\n",
            i % 7 + 1,
            i * 3
        ));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

pub fn minimal_template() -> &'static str {
    "<p>Hello, World!</p>"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_uses_pixel_without_image() {
        let html = demo_template(None);
        assert!(html.contains(PIXEL_PNG));
        assert!(demo_template(Some("/tmp/a.png")).contains("src=\"/tmp/a.png\""));
    }

    #[test]
    fn demo_options_are_valid() {
        let options = demo_options();
        assert!(options.validate().is_ok());
        assert!(options.header.show && options.footer.show);
        assert_eq!(options.footer.font_style.flags(), "bius");
    }

    #[test]
    fn generated_templates_have_requested_size() {
        assert_eq!(multi_page_template(3).matches("<p>").count(), 3);
        assert_eq!(long_table_template(5).matches("<td>Item").count(), 5);
    }
}

//! Domain Services
//!
//! The fixed certificate notification email.

use crate::domain::entities::CertificateNotice;

pub const SUBJECT: &str = "Your Issued Certificate";
pub const SENDER_NAME: &str = "CertiQ";

/// `"CertiQ" <address>`
pub fn sender(address: &str) -> String {
    format!("\"{}\" <{}>", SENDER_NAME, address)
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Only inline raster images are embedded
fn is_inline_image(url: &str) -> bool {
    url.starts_with("data:image/")
        && url.contains(";base64,")
        && !url.starts_with("data:image/svg")
}

/// Verify links must be plain web URLs
fn is_web_link(url: &str) -> bool {
    let url = url.trim().as_bytes();
    [&b"https://"[..], &b"http://"[..]]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url[..scheme.len()].eq_ignore_ascii_case(scheme))
}

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .header { text-align: center; margin-bottom: 30px; }
        .certificate-details { background-color: #f9f9f9; border-left: 4px solid #2c7be5; padding: 15px; margin-bottom: 20px; }
        .detail-row { margin-bottom: 10px; }
        .detail-label { font-weight: bold; color: #555; }
        .verification { background-color: #e8f4fe; padding: 15px; text-align: center; margin: 25px 0; border-radius: 5px; }
        .verify-button { display: inline-block; background-color: #2c7be5; color: white !important; text-decoration: none; padding: 10px 20px; border-radius: 5px; font-weight: bold; }
        .qr-code { text-align: center; margin: 20px 0; }
        .footer { margin-top: 30px; text-align: center; font-size: 12px; color: #777; border-top: 1px solid #eee; padding-top: 20px; }
        .additional-message { margin-top: 25px; padding: 15px; background-color: #f5f5f5; border-radius: 5px; }
"#;

/// Render the notification body
///
/// Every interpolated field is escaped. The issuer message block appears
/// only when the message is non-blank.
pub fn render_certificate_email(notice: &CertificateNotice) -> String {
    let detail = |label: &str, value: &str| {
        format!(
            "            <div class=\"detail-row\"><span class=\"detail-label\">{}:</span> {}</div>\n",
            label,
            escape_html(value)
        )
    };

    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("    <meta charset=\"utf-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("    <title>Certificate Verification</title>\n");
    html.push_str("    <style>");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n");

    html.push_str("    <div class=\"header\">\n        <h1>CertiQ</h1>\n");
    html.push_str(
        "        <p>A Decentralized Certificate Issuance and Verification System.</p>\n    </div>\n",
    );

    html.push_str(&format!(
        "    <p>Dear <strong>{}</strong>,</p>\n",
        escape_html(&notice.student_name)
    ));
    html.push_str(&format!(
        "    <p>Congratulations! Your certificate for completing <strong>{}</strong> has been issued and recorded on the blockchain.</p>\n",
        escape_html(&notice.course_name)
    ));

    html.push_str("    <div class=\"certificate-details\">\n");
    html.push_str(&detail("Institute", &notice.institute_name));
    html.push_str(&detail("Department", &notice.department));
    html.push_str(&detail("Course", &notice.course_name));
    html.push_str(&detail("Completion Date", &notice.completion_date));
    html.push_str(&detail("Certificate Hash", &notice.certificate_hash));
    html.push_str("    </div>\n");

    if let Some(message) = notice
        .additional_message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
    {
        html.push_str("    <div class=\"additional-message\">\n");
        html.push_str("        <p><strong>Message from the issuer:</strong></p>\n");
        html.push_str(&format!("        <p>{}</p>\n", escape_html(message)));
        html.push_str("    </div>\n");
    }

    if is_web_link(&notice.verification_url) {
        html.push_str("    <div class=\"verification\">\n");
        html.push_str(
            "        <p>You can verify the authenticity of this certificate by clicking the button below</p>\n",
        );
        html.push_str(&format!(
            "        <a href=\"{}\" class=\"verify-button\">Verify Certificate</a>\n",
            escape_html(notice.verification_url.trim())
        ));
        html.push_str("    </div>\n");
    }

    if is_inline_image(&notice.qr_code_image) {
        html.push_str(&format!(
            "    <div class=\"qr-code\"><img src=\"{}\" alt=\"Verification QR code\" width=\"160\" height=\"160\"></div>\n",
            escape_html(&notice.qr_code_image)
        ));
    }

    html.push_str(
        "    <p>This certificate is tamper-proof and permanently recorded on the blockchain.</p>\n",
    );
    html.push_str("    <div class=\"footer\">\n");
    html.push_str("        <p>This is an automated email. Please do not reply to this message.</p>\n");
    html.push_str("        <p>&copy; 2025 Certificate Verification System. All rights reserved.</p>\n");
    html.push_str("    </div>\n</body>\n</html>\n");
    html
}

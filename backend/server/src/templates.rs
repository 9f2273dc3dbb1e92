//! Confirmation email bodies.
//!
//! Everything here is fixed wedding content. The only inputs are the guest's
//! name and whether they are coming, and the two answers share nothing but the
//! greeting and the sign-off.
use std::fmt::Write;

use invite::Attending;

pub const COUPLE: &str = "Kimberly & Anesu";
pub const DATE: &str = "Thursday, January 1st, 2026";
pub const TIME: &str = "11:00 AM";
pub const VENUE: &str = "Venue Umwinzii, Harare, Zimbabwe";
pub const MAP_URL: &str = "https://maps.app.goo.gl/TLEoiFe4CojrP5Hi8?g_st=ipc";
pub const SAVE_THE_DATE: &str = "January 1, 2026 • 11:00 AM";

const BANNER_URL: &str = "https://i.ibb.co/Xr5LZcc4/email-banner.webp";
const LOGO_URL: &str = "https://i.ibb.co/Y7gKd5CT/kim-anesu.png";

pub const DRESS_CODE: [&str; 9] = [
    "#eae3d9", "#d8b59a", "#d6c1ad", "#cbbfb8", "#9c8e85", "#c4b3a2", "#c97c56", "#7c8269",
    "#7d8370",
];

pub const DIRECTIONS: [(&str, &str); 4] = [
    ("From town", "Take Enterprise Road past Chisipite Shops."),
    (
        "Continue straight",
        "To Redan Service Station at Chishawasha Hills turn-off.",
    ),
    (
        "Turn left",
        "Immediately after the station onto Umwinsidale Road.",
    ),
    ("Final turn", "Left into Venue Umwinzii just before the bridge."),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub subject: &'static str,
    pub html: String,
}

pub fn subject(attending: Attending) -> &'static str {
    match attending {
        Attending::Yes => "We're Thrilled You're Coming!",
        Attending::No => "Noted With Love, We'll Miss You!",
    }
}

pub fn confirmation(name: &str, attending: Attending) -> Rendered {
    let (heading, tagline, message) = match attending {
        Attending::Yes => (
            "Your RSVP is Confirmed!",
            "We can't wait to celebrate with you!",
            "We're absolutely thrilled to know you'll be there on our wedding day. Having you \
             with us as we take this big step means more than words can say. We can't wait to \
             celebrate, laugh, and make beautiful memories together. Your presence is truly a gift.",
        ),
        Attending::No => (
            "Thank You for Responding",
            "We appreciate you letting us know",
            "While we'll truly miss having you with us on our big day, we understand and \
             appreciate you letting us know. Your response means a great deal, and we're \
             grateful for your love and well wishes from afar. You'll be with us in spirit as \
             we celebrate.",
        ),
    };

    let mut html = String::with_capacity(8 * 1024);
    html.push_str(HEAD);

    let _ = write!(
        html,
        r#"<div style="background: white; border-radius: 30px; border: 1px solid rgba(0,0,0,0.15);">
<div style="text-align: center; overflow: hidden; border-radius: 30px 30px 0 0;"><img src="{BANNER_URL}" alt="{COUPLE}" style="width: 100%; display: block;"></div>
<div style="padding: 8%;">
<h1 style="font-family: 'Playfair Display', serif; font-size: 24px; text-align: center;">The Wedding of<br>{COUPLE}</h1>
<div style="text-align: center; margin-bottom: 30px; background-color: #faf6f0; border: 1px solid #e8d9c0; border-radius: 8px; padding: 10px;">
<h2 style="color: #b5824e; font-size: 18px; font-family: 'Playfair Display', serif;">{heading}</h2>
<p style="color: #7a6a5a; font-size: 12px;">{tagline}</p>
</div>
<p style="font-size: 14px;"><span style="font-weight: 500;">Hey {name}</span>,</p>
<p style="font-size: 14px; line-height: 1.7;">{message}</p>
"#,
        name = escape_html(name),
    );

    if attending == Attending::Yes {
        push_logistics(&mut html);
    }

    let _ = write!(
        html,
        r#"<p style="font-size: 14px; line-height: 1.7;">With love and gratitude,<br><span style="font-family: 'Playfair Display', serif; color: #b5824e; font-size: 16px;">{COUPLE}</span></p>
"#
    );

    if attending == Attending::Yes {
        let _ = write!(
            html,
            r#"<div style="text-align: center; padding-top: 20px; border-top: 1px dashed #e8c8a0;">
<img src="{LOGO_URL}" alt="{COUPLE}" style="max-width: 10%;">
<p style="font-size: 14px; color: #888;">SAVE THE DATE</p>
<p style="font-weight: 500; color: #d0a548; font-size: 15px;">{SAVE_THE_DATE}</p>
</div>
"#
        );
    }

    html.push_str("</div>\n</div>\n</div>\n</body>\n</html>\n");

    Rendered {
        subject: subject(attending),
        html,
    }
}

fn push_logistics(html: &mut String) {
    let _ = write!(
        html,
        r#"<div style="background: #f9f5f0; padding: 25px; border-radius: 8px; border-left: 4px solid #d0a548;">
<h3 style="color: #b5824e; text-align: center;">📅 WEDDING DETAILS</h3>
<table align="center" style="font-size: 14px;">
<tr><td style="color: #b5824e; text-align: right;">Date:</td><td>{DATE}</td></tr>
<tr><td style="color: #b5824e; text-align: right;">Time:</td><td>{TIME}</td></tr>
<tr><td style="color: #b5824e; text-align: right;">Venue:</td><td>{VENUE}</td></tr>
</table>
<h3 style="color: #b5824e; text-align: center;">👗 DRESS CODE</h3>
<p style="font-size: 14px; text-align: center;">We kindly encourage you to wear these elegant colors for our special day:</p>
<p style="text-align: center;">"#
    );

    for color in DRESS_CODE {
        let _ = write!(
            html,
            r#"<span style="display: inline-block; width: 28px; height: 28px; margin: 0 5px; border-radius: 50%; background-color: {color}; border: 1px solid rgba(0,0,0,0.1);"></span>"#
        );
    }

    html.push_str(
        "</p>\n<h3 style=\"color: #b5824e; text-align: center;\">📍 VENUE DIRECTIONS</h3>\n<table align=\"center\" style=\"font-size: 14px; width: 100%;\">\n",
    );

    for (step, detail) in DIRECTIONS {
        let _ = writeln!(html, "<tr><td><strong>{step}:</strong> {detail}</td></tr>");
    }

    let _ = write!(
        html,
        r#"</table>
<div style="text-align: center; margin-top: 25px;"><a href="{MAP_URL}" style="padding: 6px 12px; color: #a07242; font-size: 12px; text-decoration: none; border-radius: 12px; border: 1.5px solid #a07242;">OPEN IN MAPS</a></div>
</div>
"#
    );
}

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

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>@import url('https://fonts.googleapis.com/css2?family=Playfair+Display:wght@400;500;600&family=Montserrat:wght@300;400;500&display=swap');</style>
</head>
<body style="margin: 0; padding: 0; font-family: 'Montserrat', 'Helvetica Neue', Arial, sans-serif; color: #555; background-color: #fcfaf7;">
<div style="margin: 0 auto; padding: 5%;">
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attending_gets_logistics() {
        let rendered = confirmation("Jane Doe", Attending::Yes);

        assert_eq!(rendered.subject, "We're Thrilled You're Coming!");
        assert!(rendered.html.contains("Your RSVP is Confirmed!"));
        assert!(rendered.html.contains("Hey Jane Doe"));
        assert!(rendered.html.contains(DATE));
        assert!(rendered.html.contains(TIME));
        assert!(rendered.html.contains(VENUE));
        assert!(rendered.html.contains(MAP_URL));
        assert!(rendered.html.contains("SAVE THE DATE"));
        assert!(DRESS_CODE.iter().all(|color| rendered.html.contains(color)));
        assert!(DIRECTIONS.iter().all(|(_, detail)| rendered.html.contains(detail)));
        assert!(!rendered.html.contains("Thank You for Responding"));
    }

    #[test]
    fn test_declining_gets_short_acknowledgment() {
        let rendered = confirmation("Jane Doe", Attending::No);

        assert_eq!(rendered.subject, "Noted With Love, We'll Miss You!");
        assert!(rendered.html.contains("Thank You for Responding"));
        assert!(rendered.html.contains("Hey Jane Doe"));
        assert!(!rendered.html.contains("WEDDING DETAILS"));
        assert!(!rendered.html.contains(MAP_URL));
        assert!(!rendered.html.contains("SAVE THE DATE"));
        assert!(!rendered.html.contains("Your RSVP is Confirmed!"));
    }

    #[test]
    fn test_name_is_escaped() {
        let rendered = confirmation("<script>alert('x')</script> & Co", Attending::No);

        assert!(!rendered.html.contains("<script>"));
        assert!(rendered.html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; Co"));
    }
}

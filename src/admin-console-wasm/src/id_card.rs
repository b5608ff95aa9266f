use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::config::SchoolInfo;
use crate::html::escape_html;

pub const DEFAULT_PICTURE: &str = "/Uploads/default.jpg";

// Same set `encodeURIComponent` leaves alone
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardHolder {
    Student,
    Staff,
}

impl CardHolder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(CardHolder::Student),
            "staff" => Some(CardHolder::Staff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CardHolder::Student => "student",
            CardHolder::Staff => "staff",
        }
    }

    pub fn theme_color(&self) -> &'static str {
        match self {
            CardHolder::Student => "#065f46",
            CardHolder::Staff => "#1e3a8a",
        }
    }
}

/// Data behind one printable ID card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCard {
    pub holder: CardHolder,
    pub id: String,
    pub name: String,
    /// Student or staff number printed on the card
    pub entity_id: String,
    #[serde(default)]
    pub picture: Option<String>,
}

impl IdCard {
    pub fn picture_src(&self) -> String {
        match self.picture.as_deref() {
            Some(picture) if !picture.is_empty() => format!("/{}", picture),
            _ => DEFAULT_PICTURE.to_string(),
        }
    }

    pub fn download_file_name(&self) -> String {
        let entity = if self.entity_id.is_empty() {
            "card"
        } else {
            self.entity_id.as_str()
        };
        format!("ID_Card_{}.png", utf8_percent_encode(entity, COMPONENT))
    }

    /// Two-sided card markup rooted at `#idCardCanvas`
    pub fn render_html(&self, school: &SchoolInfo, issued: NaiveDate) -> String {
        let theme = self.holder.theme_color();
        let school_name = escape_html(&school.name);

        format!(
            r#"<div id="idCardCanvas" style="width: 250px; margin: 0 auto; font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif; display: flex; flex-direction: column; gap: 20px;">
  <div style="width: 250px; height: 380px; background: #ffffff; border-radius: 15px; position: relative; overflow: hidden; display: flex; flex-direction: column; align-items: center; box-shadow: 0 10px 25px rgba(0,0,0,0.2); border: 1px solid #e5e7eb;">
    <div style="background: {theme}; width: 100%; height: 90px; display: flex; flex-direction: column; align-items: center; justify-content: center; color: white;">
      <img src="{logo}" alt="Logo" style="width: 55px; height: 55px; border-radius: 50%; border: 3px solid white; background: white; object-fit: contain;" onerror="this.src='{fallback}'">
    </div>
    <div style="text-align: center; margin-top: 10px; padding: 0 10px;">
      <h3 style="margin: 0; font-size: 13px; font-weight: 800; color: {theme}; text-transform: uppercase;">{school_name}</h3>
      <p style="margin: 0; font-size: 10px; font-weight: 600; color: #6b7280;">{sub_name}</p>
    </div>
    <div style="margin-top: 15px; width: 100px; height: 100px; border-radius: 50%; padding: 3px; background: linear-gradient(to bottom, {theme}, #e5e7eb);">
      <img src="{picture}" alt="Photo" style="width: 94px; height: 94px; border-radius: 50%; object-fit: cover; background: white;" onerror="this.src='{fallback}'">
    </div>
    <div style="text-align: center; margin-top: 12px; width: 100%; padding: 0 15px;">
      <h4 style="margin: 0; font-size: 15px; color: #111827; font-weight: 700;">{name}</h4>
      <p style="margin: 5px 0; font-size: 11px; font-weight: 700; color: {theme}; letter-spacing: 2px;">{holder}</p>
      <div style="margin-top: 10px; background: #f9fafb; border: 1px solid #e5e7eb; padding: 8px; border-radius: 8px;">
        <span style="font-size: 9px; color: #9ca3af; display: block; font-weight: 600;">ID NUMBER</span>
        <strong style="font-size: 13px; color: #111827;">{entity_id}</strong>
      </div>
    </div>
    <div style="position: absolute; bottom: 0; width: 100%; height: 8px; background: {theme};"></div>
  </div>
  <div style="width: 250px; height: 380px; background: #fefefe; border-radius: 15px; border: 1px solid #e5e7eb; display: flex; flex-direction: column; overflow: hidden;">
    <div style="background: #374151; padding: 12px; color: white; text-align: center;">
      <span style="font-size: 10px; font-weight: 700; letter-spacing: 1.5px;">INFORMATION &amp; POLICY</span>
    </div>
    <div style="padding: 20px 15px; flex-grow: 1; display: flex; flex-direction: column; text-align: center;">
      <div style="font-size: 9px; color: #4b5563; line-height: 1.6; text-align: justify; margin-bottom: 15px;">
        This card is an official document of <strong>{school_name}</strong>. The holder is entitled to all privileges associated with their role. Loss of this card must be reported immediately.
      </div>
      <div style="background: #fff1f2; border-left: 4px solid #e11d48; padding: 8px; margin-bottom: 15px;">
        <p style="font-size: 9px; font-weight: 700; color: #9f1239; margin: 0;">RETURN POLICY:</p>
        <p style="font-size: 8.5px; color: #be123c; margin: 2px 0 0;">Must be returned to administration upon graduation or termination of service.</p>
      </div>
      <div style="margin-top: auto;">
        <p style="font-size: 9px; color: #374151; font-weight: 600;">{address}</p>
        <p style="font-size: 9px; color: {theme}; font-weight: 700; margin: 4px 0;">{phone}</p>
        <div style="margin-top: 20px; display: flex; flex-direction: column; align-items: center;">
          <div style="width: 120px; border-top: 1px solid #111827; margin-bottom: 4px;"></div>
          <p style="font-size: 9px; font-weight: 700; color: #111827;">Authorized Signature</p>
          <p style="font-size: 8px; color: #6b7280;">Issued: {issued}</p>
        </div>
      </div>
    </div>
    <div style="background: #f3f4f6; padding: 6px; text-align: center; border-top: 1px solid #e5e7eb;">
      <small style="font-size: 8px; color: #9ca3af; font-weight: 600;">{website}</small>
    </div>
  </div>
</div>"#,
            theme = theme,
            logo = escape_html(&school.logo_src),
            fallback = DEFAULT_PICTURE,
            school_name = school_name,
            sub_name = escape_html(&school.sub_name),
            picture = escape_html(&self.picture_src()),
            name = escape_html(&self.name.to_uppercase()),
            holder = self.holder.as_str().to_uppercase(),
            entity_id = escape_html(&self.entity_id),
            address = escape_html(&school.address),
            phone = escape_html(&school.phone),
            issued = issued.format("%d/%m/%Y"),
            website = escape_html(&school.website),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_card(holder: CardHolder, entity_id: &str, picture: Option<&str>) -> IdCard {
        IdCard {
            holder,
            id: "12".to_string(),
            name: "Aisha <Bello>".to_string(),
            entity_id: entity_id.to_string(),
            picture: picture.map(str::to_string),
        }
    }

    #[test]
    fn test_picture_src() {
        let card = create_test_card(CardHolder::Student, "STU-1", Some("Uploads/aisha.jpg"));
        assert_eq!(card.picture_src(), "/Uploads/aisha.jpg");

        let card = create_test_card(CardHolder::Student, "STU-1", Some(""));
        assert_eq!(card.picture_src(), DEFAULT_PICTURE);
        let card = create_test_card(CardHolder::Student, "STU-1", None);
        assert_eq!(card.picture_src(), DEFAULT_PICTURE);
    }

    #[test]
    fn test_download_file_name() {
        let card = create_test_card(CardHolder::Staff, "STF/01", None);
        assert_eq!(card.download_file_name(), "ID_Card_STF%2F01.png");

        let card = create_test_card(CardHolder::Student, "STU-1 A", None);
        assert_eq!(card.download_file_name(), "ID_Card_STU-1%20A.png");

        let card = create_test_card(CardHolder::Staff, "", None);
        assert_eq!(card.download_file_name(), "ID_Card_card.png");
    }

    #[test]
    fn test_render_html() {
        let card = create_test_card(CardHolder::Staff, "STF-9", None);
        let issued = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let html = card.render_html(&SchoolInfo::default(), issued);

        assert!(html.starts_with(r#"<div id="idCardCanvas""#));
        assert!(html.contains("#1e3a8a"));
        assert!(!html.contains("#065f46"));
        assert!(html.contains("AISHA &lt;BELLO&gt;"));
        assert!(html.contains(">STAFF<"));
        assert!(html.contains("Issued: 07/03/2025"));
        assert!(html.contains("www.ibadurrahman.edu.ng"));
        assert!(html.contains("Ibadurrahman College"));
    }

    #[test]
    fn test_holder_parse() {
        assert_eq!(CardHolder::parse("student"), Some(CardHolder::Student));
        assert_eq!(CardHolder::parse("staff"), Some(CardHolder::Staff));
        assert_eq!(CardHolder::parse("parent"), None);
        assert_eq!(CardHolder::Student.theme_color(), "#065f46");
    }
}

use crate::core::phone::digits_only;

pub const DEFAULT_WHATSAPP_URL: &str = "https://wa.me/";

/// Turns an already normalized phone number into a click-to-chat link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsappLinker {
    base_url: String,
}

impl WhatsappLinker {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn link(&self, phone: Option<&str>) -> Option<String> {
        let digits = digits_only(phone?)?;
        Some(format!("{}{}", self.base_url, digits))
    }
}

impl Default for WhatsappLinker {
    fn default() -> Self {
        Self::new(DEFAULT_WHATSAPP_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link() {
        let linker = WhatsappLinker::default();
        assert_eq!(
            linker.link(Some("34917223000")),
            Some("https://wa.me/34917223000".to_string())
        );
        assert_eq!(
            linker.link(Some("+34 917 223 000")),
            Some("https://wa.me/34917223000".to_string())
        );
        assert_eq!(linker.link(None), None);
        assert_eq!(linker.link(Some("")), None);
    }

    #[test]
    fn test_custom_base_url() {
        let linker = WhatsappLinker::new("https://api.whatsapp.com/send?phone=");
        assert_eq!(
            linker.link(Some("8613800138000")),
            Some("https://api.whatsapp.com/send?phone=8613800138000".to_string())
        );
    }
}

//! Self-contained HTML appraisal card for a received gift.
//!
//! The page is a single file: the product image is inlined as a `data:` URI
//! whenever it can be fetched, and styling comes from the Tailwind CDN.

use crate::error::{Result, ToolkitError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use quick_xml::escape::escape;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A suggested reply to thank the giver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThankYouNote {
    #[serde(default)]
    pub style: String,
    pub content: String,
}

/// A suggested return gift.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReturnGift {
    #[serde(default)]
    pub target: String,
    pub item: String,
    #[serde(default)]
    pub reason: String,
}

/// Visual theme of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vibe {
    Luxury,
    Standard,
    Budget,
}

/// Tailwind classes for one vibe.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub page_bg: &'static str,
    pub card_bg: &'static str,
    pub text_main: &'static str,
    pub text_sub: &'static str,
    pub accent: &'static str,
    pub tag_bg: &'static str,
    pub img_bg: &'static str,
}

impl Vibe {
    /// Unknown codes fall back to `Standard`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "luxury" => Vibe::Luxury,
            "budget" => Vibe::Budget,
            _ => Vibe::Standard,
        }
    }

    pub fn theme(self) -> Theme {
        match self {
            Vibe::Luxury => Theme {
                page_bg: "bg-neutral-900",
                card_bg: "bg-neutral-900/80 backdrop-blur-xl border border-white/10",
                text_main: "text-white",
                text_sub: "text-neutral-400",
                accent: "text-amber-400",
                tag_bg: "bg-amber-400/20 text-amber-400",
                img_bg: "bg-neutral-800",
            },
            Vibe::Standard => Theme {
                page_bg: "bg-stone-200",
                card_bg: "bg-white/95 backdrop-blur-xl border border-stone-200",
                text_main: "text-stone-800",
                text_sub: "text-stone-500",
                accent: "text-red-600",
                tag_bg: "bg-red-50 text-red-600",
                img_bg: "bg-stone-100",
            },
            Vibe::Budget => Theme {
                page_bg: "bg-yellow-50",
                card_bg: "bg-white border-4 border-black shadow-[8px_8px_0px_0px_rgba(0,0,0,1)]",
                text_main: "text-black",
                text_sub: "text-gray-600",
                accent: "text-blue-600",
                tag_bg: "bg-black text-white",
                img_bg: "bg-gray-200",
            },
        }
    }
}

impl Theme {
    fn is_dark(&self) -> bool {
        self.text_main == "text-white"
    }

    /// Color family of the accent ("text-amber-400" -> "amber").
    fn accent_color(&self) -> &'static str {
        self.accent.split('-').nth(1).unwrap_or("red")
    }
}

/// Everything the card shows. JSON fields are kept raw so unparsable input
/// can still be rendered.
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub product_name: String,
    pub price: String,
    pub evaluation: String,
    pub thank_you_json: String,
    pub return_gift_json: String,
    pub vibe_code: String,
    pub image_url: String,
}

/// Parse reply suggestions; unparsable input becomes one general reply.
pub fn parse_thank_you(json: &str) -> Vec<ThankYouNote> {
    serde_json::from_str(json).unwrap_or_else(|e| {
        log::warn!("thank-you JSON not parsed ({}); using it as a single reply", e);
        vec![ThankYouNote {
            style: "General".to_string(),
            content: json.to_string(),
        }]
    })
}

/// Parse return-gift suggestions; unparsable input becomes one suggestion.
pub fn parse_return_gifts(json: &str) -> Vec<ReturnGift> {
    serde_json::from_str(json).unwrap_or_else(|e| {
        log::warn!("return-gift JSON not parsed ({}); using it as a single item", e);
        vec![ReturnGift {
            target: "General advice".to_string(),
            item: json.to_string(),
            reason: "A safe choice".to_string(),
        }]
    })
}

/// MIME type from a file extension, if it is a known image type.
pub fn guess_image_mime(path: &str) -> Option<&'static str> {
    let ext = Path::new(path.split(['?', '#']).next().unwrap_or(path))
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

fn fetch_remote(url: &str) -> Result<(Vec<u8>, Option<String>)> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent("Mozilla/5.0")
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    let mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    Ok((response.bytes()?.to_vec(), mime))
}

fn load_image(src: &str) -> Result<Option<(Vec<u8>, Option<String>)>> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return fetch_remote(src).map(Some);
    }
    let path = Path::new(src);
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some((std::fs::read(path)?, None)))
}

/// Turn an image URL or local path into a `data:` URI. On any failure the
/// original reference is returned unchanged.
pub fn inline_image(src: &str) -> String {
    match load_image(src) {
        Ok(Some((bytes, mime))) if !bytes.is_empty() => {
            let mime = mime
                .or_else(|| guess_image_mime(src).map(str::to_string))
                .unwrap_or_else(|| "image/jpeg".to_string());
            format!("data:{};base64,{}", mime, BASE64.encode(bytes))
        }
        Ok(_) => src.to_string(),
        Err(e) => {
            log::warn!("Could not inline image {}: {}; keeping the link", src, e);
            src.to_string()
        }
    }
}

fn thank_you_html(notes: &[ThankYouNote], theme: &Theme) -> String {
    let (bubble, hover) = bubble_classes(theme);
    notes
        .iter()
        .map(|note| {
            format!(
                r#"
        <div class="group relative p-4 rounded-xl {bubble} border {hover} transition-all cursor-pointer mb-3" data-copy="{copy}" onclick="copyText(this)">
            <div class="flex justify-between items-center mb-2">
                <span class="text-xs font-bold {accent} border border-current px-2 py-0.5 rounded-full">{style}</span>
                <span class="text-[10px] opacity-60 group-hover:opacity-100 transition-opacity {sub}">Click to copy</span>
            </div>
            <p class="text-sm {main} leading-relaxed opacity-95 font-medium">{content}</p>
            <div class="copy-feedback absolute inset-0 bg-{color}-500 text-white flex items-center justify-center rounded-xl opacity-0 pointer-events-none transition-opacity duration-200 font-bold z-10">
                <span>&#10003; Copied</span>
            </div>
        </div>"#,
                bubble = bubble,
                hover = hover,
                copy = escape(note.content.as_str()),
                accent = theme.accent,
                style = escape(note.style.as_str()),
                sub = theme.text_sub,
                main = theme.text_main,
                content = escape(note.content.as_str()),
                color = theme.accent_color(),
            )
        })
        .collect()
}

fn return_gift_html(gifts: &[ReturnGift], theme: &Theme) -> String {
    let (bubble, _) = bubble_classes(theme);
    gifts
        .iter()
        .map(|gift| {
            format!(
                r#"
        <div class="p-4 rounded-xl {bubble} border flex flex-col justify-between h-full hover:scale-[1.02] transition-transform duration-300">
            <div class="flex items-center gap-2 mb-2">
                <div class="w-1.5 h-1.5 rounded-full bg-current {accent}"></div>
                <div class="text-xs font-bold uppercase tracking-wider {sub}">{target}</div>
            </div>
            <div class="font-bold {main} text-lg mb-2">{item}</div>
            <div class="text-xs {sub} opacity-80 leading-snug bg-black/5 p-2 rounded">{reason}</div>
        </div>"#,
                bubble = bubble,
                accent = theme.accent,
                sub = theme.text_sub,
                target = escape(gift.target.as_str()),
                main = theme.text_main,
                item = escape(gift.item.as_str()),
                reason = escape(gift.reason.as_str()),
            )
        })
        .collect()
}

fn bubble_classes(theme: &Theme) -> (&'static str, &'static str) {
    if theme.is_dark() {
        ("bg-white/10 border-white/10", "hover:bg-white/20")
    } else {
        ("bg-black/5 border-black/5", "hover:bg-black/10")
    }
}

/// Render the full page. `image_src` is used verbatim as the `<img>` source.
pub fn render_report(request: &ReportRequest, image_src: &str) -> String {
    let theme = Vibe::from_code(&request.vibe_code).theme();
    let divider = if theme.is_dark() {
        "border-white/20"
    } else {
        "border-black/10"
    };
    let replies = thank_you_html(&parse_thank_you(&request.thank_you_json), &theme);
    let gifts = return_gift_html(&parse_return_gifts(&request.return_gift_json), &theme);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Gift Appraisal Report</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;600;800&family=Noto+Serif+SC:wght@700;900&display=swap" rel="stylesheet">
    <style>
        body {{ font-family: 'Inter', sans-serif; }}
        .serif {{ font-family: 'Noto Serif SC', serif; }}
        .custom-scroll::-webkit-scrollbar {{ width: 4px; }}
        .custom-scroll::-webkit-scrollbar-thumb {{ background-color: rgba(150,150,150,0.3); border-radius: 4px; }}
    </style>
</head>
<body class="{page_bg} min-h-screen flex items-center justify-center p-2 md:p-8">
    <div class="w-full max-w-6xl {card_bg} rounded-[2.5rem] shadow-2xl overflow-hidden relative flex flex-col md:flex-row md:h-[750px]">
        <div class="w-full md:w-[45%] flex flex-col relative shrink-0 border-b md:border-b-0 md:border-r {divider}">
            <div class="relative h-72 md:h-[55%] group overflow-hidden {img_bg} flex items-center justify-center p-6">
                <img src="{image}" alt="{product}" class="w-full h-full object-contain relative z-10 drop-shadow-xl transition-transform duration-700 group-hover:scale-105">
                <div class="absolute inset-x-0 bottom-0 h-32 bg-gradient-to-t from-black/80 to-transparent z-20 pointer-events-none"></div>
                <div class="absolute bottom-6 left-6 right-6 z-30">
                    <div class="inline-block px-3 py-1 rounded-lg text-[10px] font-bold uppercase tracking-widest mb-2 {tag_bg}">AI Gift Analysis</div>
                    <h1 class="text-3xl md:text-4xl font-black text-white leading-tight serif mb-1 truncate">{product}</h1>
                    <div class="flex items-baseline gap-2 text-white/90">
                        <span class="text-sm font-light opacity-80">Estimated value</span>
                        <span class="text-3xl font-bold tracking-tight">{price}</span>
                    </div>
                </div>
            </div>
            <div class="flex-1 p-6 md:p-8 flex flex-col min-h-0 relative">
                <h3 class="text-xs font-bold uppercase tracking-widest {text_sub} mb-3">Expert appraisal</h3>
                <div class="{text_main} text-base md:text-lg leading-relaxed italic font-medium overflow-y-auto custom-scroll flex-1 pr-2">{evaluation}</div>
                <div class="mt-4 pt-4 border-t {divider} flex items-center gap-3 shrink-0">
                    <div class="w-8 h-8 rounded-full {tag_bg} flex items-center justify-center font-bold text-xs">AI</div>
                    <div class="flex flex-col">
                        <span class="text-xs font-bold {text_main}">Chief Appraiser</span>
                        <span class="text-[10px] {text_sub}">Verified Analysis</span>
                    </div>
                </div>
            </div>
        </div>
        <div class="w-full md:w-[55%] overflow-y-auto custom-scroll p-6 md:p-10 flex flex-col gap-8">
            <div>
                <div class="mb-5 border-b {divider} pb-3">
                    <h2 class="text-xl md:text-2xl font-bold {text_main}">Reply suggestions</h2>
                    <p class="text-xs {text_sub}">Click a card to copy it</p>
                </div>
                <div class="space-y-1">{replies}
                </div>
            </div>
            <div>
                <div class="mb-5 mt-2 border-b {divider} pb-3">
                    <h2 class="text-xl md:text-2xl font-bold {text_main}">Return gift ideas</h2>
                    <p class="text-xs {text_sub}">Matched to the price range</p>
                </div>
                <div class="grid grid-cols-1 sm:grid-cols-2 gap-3">{gifts}
                </div>
            </div>
        </div>
    </div>
    <script>
        function copyText(element) {{
            navigator.clipboard.writeText(element.dataset.copy).then(() => {{
                const feedback = element.querySelector('.copy-feedback');
                feedback.classList.remove('opacity-0');
                setTimeout(() => feedback.classList.add('opacity-0'), 1500);
            }});
        }}
    </script>
</body>
</html>
"#,
        page_bg = theme.page_bg,
        card_bg = theme.card_bg,
        divider = divider,
        img_bg = theme.img_bg,
        image = escape(image_src),
        product = escape(request.product_name.as_str()),
        tag_bg = theme.tag_bg,
        price = escape(request.price.as_str()),
        text_sub = theme.text_sub,
        text_main = theme.text_main,
        evaluation = escape(request.evaluation.as_str()),
        replies = replies,
        gifts = gifts,
    )
}

/// Render the report and write it to `output`, creating parent directories.
/// Returns the absolute path of the written file.
pub fn generate_report(request: &ReportRequest, output: &Path) -> Result<PathBuf> {
    let image_src = inline_image(&request.image_url);
    let html = render_report(request, &image_src);

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(output, html)?;
    let path = std::fs::canonicalize(output).map_err(ToolkitError::Io)?;
    log::info!("Report written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ReportRequest {
        ReportRequest {
            product_name: "Tea <Set>".to_string(),
            price: "$120".to_string(),
            evaluation: "<script>alert(1)</script> Lovely".to_string(),
            thank_you_json: r#"[{"style":"Warm","content":"Thanks so much!"}]"#.to_string(),
            return_gift_json: r#"[{"target":"Parents","item":"Honey","reason":"Healthy"}]"#
                .to_string(),
            vibe_code: "luxury".to_string(),
            image_url: "missing.png".to_string(),
        }
    }

    #[test]
    fn test_vibe_codes() {
        assert_eq!(Vibe::from_code("luxury"), Vibe::Luxury);
        assert_eq!(Vibe::from_code("BUDGET"), Vibe::Budget);
        assert_eq!(Vibe::from_code("whatever"), Vibe::Standard);
        assert_eq!(Vibe::Luxury.theme().accent_color(), "amber");
        assert_eq!(Vibe::Standard.theme().accent_color(), "red");
    }

    #[test]
    fn test_json_fallbacks() {
        let notes = parse_thank_you("just say thanks");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "just say thanks");
        assert_eq!(notes[0].style, "General");

        let gifts = parse_return_gifts("{broken");
        assert_eq!(gifts.len(), 1);
        assert_eq!(gifts[0].item, "{broken");
    }

    #[test]
    fn test_render_escapes_user_text() {
        let html = render_report(&request(), "missing.png");
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; Lovely"));
        assert!(html.contains("Tea &lt;Set&gt;"));
        assert!(html.contains("bg-neutral-900"));
        assert!(html.contains("bg-amber-500"));
        assert!(html.contains(r#"data-copy="Thanks so much!""#));
        assert!(html.contains("Honey"));
    }

    #[test]
    fn test_guess_image_mime() {
        assert_eq!(guess_image_mime("a/b/photo.PNG"), Some("image/png"));
        assert_eq!(guess_image_mime("https://x.test/p.jpg?w=200"), Some("image/jpeg"));
        assert_eq!(guess_image_mime("noext"), None);
    }

    #[test]
    fn test_inline_local_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        let src = inline_image(path.to_str().unwrap());
        assert_eq!(src, "data:image/png;base64,AQID");

        assert_eq!(inline_image("not/here.jpg"), "not/here.jpg");
    }

    #[test]
    fn test_generate_report_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested/out/card.html");
        let path = generate_report(&request(), &output).unwrap();
        assert!(path.is_absolute());
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"src="missing.png""#));
    }
}

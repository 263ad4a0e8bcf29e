use actix_web::{HttpRequest, HttpResponse, Result, web};
use rust_embed::Embed;
use tracing::{debug, trace};

// 落地页静态文件在编译期嵌入
#[derive(Embed)]
#[folder = "assets/"]
struct LandingAssets;

/// 转义插入 HTML 的配置文本
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub struct FrontendService;

impl FrontendService {
    /// 落地页 index.html，替换标题等占位符
    pub async fn handle_index() -> Result<HttpResponse> {
        trace!("Serving landing page");

        let Some(content) = LandingAssets::get("index.html") else {
            debug!("index.html is missing from embedded assets");
            return Ok(HttpResponse::NotFound().body("Not Found"));
        };

        let config = crate::config::get_config();
        let html = String::from_utf8_lossy(&content.data)
            .replace("%PROFILE_NAME%", &escape_html(&config.profile.name))
            .replace("%PROFILE_SUBTITLE%", &escape_html(&config.profile.subtitle))
            .replace("%LINKHUB_VERSION%", env!("CARGO_PKG_VERSION"));

        Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html))
    }

    /// 处理静态资源文件
    pub async fn handle_static(req: HttpRequest) -> Result<HttpResponse> {
        let path = req.match_info().query("path");
        trace!("Serving static file: {}", path);

        if path == "index.html" {
            return Self::handle_index().await;
        }

        match LandingAssets::get(path) {
            Some(content) => Ok(HttpResponse::Ok()
                .content_type(Self::get_content_type(path))
                .body(content.data.into_owned())),
            None => {
                debug!("Static file not found: {}", path);
                Ok(HttpResponse::NotFound().body("File not found"))
            }
        }
    }

    /// 根据文件扩展名确定 Content-Type
    fn get_content_type(path: &str) -> &'static str {
        match path.split('.').next_back() {
            Some("css") => "text/css",
            Some("js") => "application/javascript",
            Some("json") => "application/json",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("svg") => "image/svg+xml",
            Some("ico") => "image/x-icon",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

/// 落地页路由
pub fn frontend_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(FrontendService::handle_index))
        .route("/static/{path:.*}", web::get().to(FrontendService::handle_static));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(FrontendService::get_content_type("landing.css"), "text/css");
        assert_eq!(
            FrontendService::get_content_type("landing.js"),
            "application/javascript"
        );
        assert_eq!(
            FrontendService::get_content_type("blob"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_index_is_embedded() {
        assert!(LandingAssets::get("index.html").is_some());
    }
}

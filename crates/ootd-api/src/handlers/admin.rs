//! Admin console placeholder.

use axum::response::Html;

const ADMIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="utf-8">
    <title>관리자 대시보드</title>
</head>
<body>
    <h1>오늘 무엇을 입을까? - 관리자 시스템</h1>
    <p>이용자 관리, 통계 모니터링, 프롬프트 최적화 로그 확인 기능이 구현될 예정입니다.</p>
</body>
</html>
"#;

/// Serve the static admin page.
pub async fn admin_page() -> Html<&'static str> {
    Html(ADMIN_PAGE)
}

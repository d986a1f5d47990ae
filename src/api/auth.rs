use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use actix_web::cookie::Cookie;
use sea_orm::DatabaseConnection;
use crate::auth::jwt::{build_access_token_cookie, build_refresh_token_cookie, JwtUtils, TokenVerifyResult, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::entity::user::Role;
use crate::model::auth::{AuthUser, LoginRequest, RegisterRequest, UserResponse};
use crate::model::global_error::{AppError, ErrorCode};
use crate::service::user as user_service;

#[utoipa::path(
    post,
    path = "/auth/register",
    summary = "회원 가입",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "가입 성공", body = UserResponse),
        (status = 400, description = "유효성 검증 실패"),
        (status = 409, description = "이미 사용 중인 계정"),
    ),
    tag = "auth",
)]
#[post("/auth/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    jwt: web::Data<JwtUtils>,
) -> Result<HttpResponse, AppError> {
    // 주최자 계정은 기본 주최자 설정으로만 만든다
    let user = user_service::create_user(db.get_ref(), &body.username, &body.email, &body.password, Role::User).await?;

    let access_token = jwt.generate_token(user.id, user.role)?;
    let refresh_token_str = jwt.generate_refresh_token(user.id)?;

    Ok(HttpResponse::Created()
        .cookie(build_access_token_cookie(&access_token))
        .cookie(build_refresh_token_cookie(&refresh_token_str))
        .json(UserResponse::from(user))
    )
}

#[utoipa::path(
    post,
    path = "/auth/login",
    summary = "로그인",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = UserResponse),
        (status = 400, description = "잘못된 자격 증명"),
    ),
    tag = "auth",
)]
#[post("/auth/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    jwt: web::Data<JwtUtils>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::authenticate(db.get_ref(), &body.email, &body.password).await?;

    let access_token = jwt.generate_token(user.id, user.role)?;
    let refresh_token_str = jwt.generate_refresh_token(user.id)?;

    Ok(HttpResponse::Ok()
        .cookie(build_access_token_cookie(&access_token))
        .cookie(build_refresh_token_cookie(&refresh_token_str))
        .json(UserResponse::from(user))
    )
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    summary = "액세스 토큰 재발급",
    responses(
        (status = 200, description = "재발급 성공"),
        (status = 400, description = "리프레시 토큰 오류"),
    ),
    tag = "auth",
)]
#[post("/auth/refresh")]
pub async fn refresh_token(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    jwt: web::Data<JwtUtils>,
) -> Result<HttpResponse, AppError> {
    let refresh_token_cookie = req.cookie(REFRESH_TOKEN_COOKIE)
        .ok_or_else(|| AppError::unauthorized(ErrorCode::InvalidAuthToken))?;

    match jwt.verify_token(refresh_token_cookie.value()) {
        TokenVerifyResult::Valid(claims) => {
            if !claims.is_refresh() {
                return Err(AppError::bad_request(ErrorCode::NotRefreshToken));
            }

            let user_id = claims.sub.parse::<i32>()
                .map_err(|_| AppError::bad_request(ErrorCode::InvalidRefreshToken))?;

            // 역할이 바뀌었을 수 있으므로 DB 의 최신 값으로 발급
            let user = user_service::find(db.get_ref(), user_id).await?;
            let new_access_token = jwt.generate_token(user.id, user.role)?;

            Ok(HttpResponse::Ok()
                .cookie(build_access_token_cookie(&new_access_token))
                .finish())
        }
        TokenVerifyResult::Expired | TokenVerifyResult::Invalid => {
            Err(AppError::bad_request(ErrorCode::InvalidRefreshToken))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    summary = "내 정보 조회",
    responses(
        (status = 200, description = "조회 성공", body = UserResponse),
    ),
    tag = "auth",
)]
#[get("/auth/me")]
pub async fn get_me(
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::find(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/auth/me",
    summary = "회원 탈퇴",
    responses(
        (status = 204, description = "탈퇴 성공"),
        (status = 409, description = "주최 중인 이벤트가 남아 있음"),
    ),
    tag = "auth",
)]
#[delete("/auth/me")]
pub async fn delete_me(
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    user_service::delete_user(db.get_ref(), auth_user.user_id).await?;

    let mut access = Cookie::named(ACCESS_TOKEN_COOKIE);
    access.set_path("/");
    let mut refresh = Cookie::named(REFRESH_TOKEN_COOKIE);
    refresh.set_path("/");

    let mut response = HttpResponse::NoContent().finish();
    response.add_removal_cookie(&access).map_err(|_| AppError::internal_error(ErrorCode::InternalError))?;
    response.add_removal_cookie(&refresh).map_err(|_| AppError::internal_error(ErrorCode::InternalError))?;

    Ok(response)
}

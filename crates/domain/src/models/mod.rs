//! Domain models for the Cinematic Platform.

pub mod content;
pub mod movie_request;
pub mod setting;
pub mod subscription;
pub mod user;

pub use content::{
    AddToWatchlistRequest, AdminContentResponse, CategoriesResponse, Content, ContentFilter,
    ContentItem, ContentListResponse, CreateContentRequest, CreateContentResponse,
    FavoriteGenreRequest, FavoriteGenreResponse, RecommendationItem, RecommendationsResponse,
    UpdateContentRequest, RECOMMENDATION_LIMIT,
};
pub use movie_request::{
    AdminMovieRequestItem, AdminMovieRequestsResponse, CreateMovieRequestRequest,
    LimitStatusResponse, MovieRequest, MovieRequestItem, MovieRequestStatus,
    MyMovieRequestsResponse, SubmitMovieRequestResponse, UpdateMovieRequestStatusRequest,
};
pub use setting::{
    parse_request_limit, validate_request_limit, Setting, SettingsResponse,
    UpdateRequestLimitRequest, UpdateRequestLimitResponse, DEFAULT_REQUEST_LIMIT,
    MAX_REQUEST_LIMIT, MIN_REQUEST_LIMIT, REQUEST_LIMIT_KEY,
};
pub use subscription::{
    expiry_date_for, ActiveSubscriptionItem, ActiveSubscriptionsResponse,
    AdminGrantSubscriptionRequest, AdminUpdateSubscriptionRequest, MemberDashboardResponse, Plan,
    PlansResponse, SubscribeRequest, SubscribeResponse, Subscription, SubscriptionSummary,
    EXPIRY_WARNING_DAYS,
};
pub use user::{
    AccountStatus, AdminUserItem, AdminUsersResponse, LoginHistoryItem, LoginHistoryResponse,
    User, UserProfile, UserRole,
};

mod auth_dto;

pub use auth_dto::{
    AccessTokenResponseDto, LoginRequestDto, RefreshTokenRequestDto, RegisterRequestDto,
    TokenPairResponseDto, UserResponseDto,
};

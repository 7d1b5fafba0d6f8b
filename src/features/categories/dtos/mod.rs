mod category_dto;

pub use category_dto::{
    CategoryQueryParams, CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};

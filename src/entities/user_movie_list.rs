use sea_orm::entity::prelude::*;

/// Which of a user's lists an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum MovieListKind {
    #[sea_orm(string_value = "my_list")]
    MyList,
    #[sea_orm(string_value = "liked")]
    Liked,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_movie_lists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub list: MovieListKind,
    /// Referenced by value; movies are not foreign keys here
    pub movie_id: i64,
    pub created_at: i64,

    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            created_at: sea_orm::Set(chrono::Utc::now().timestamp()),
            ..ActiveModelTrait::default()
        }
    }
}

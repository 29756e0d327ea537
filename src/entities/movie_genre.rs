use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "movie_genres")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub movie_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub genre_id: i64,

    #[sea_orm(belongs_to, from = "movie_id", to = "id")]
    pub movie: HasOne<super::movie::Entity>,
    #[sea_orm(belongs_to, from = "genre_id", to = "id")]
    pub genre: HasOne<super::genre::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
